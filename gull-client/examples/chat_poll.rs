//! Interactive Chat Session Example
//!
//! Demonstrates the full synchronization loop against a live backend:
//! 1. Authenticate to obtain a token
//! 2. Subscribe to a session's messages and reservations
//! 3. Send messages from stdin; watch the log converge after each send
//!
//! Run: cargo run --example chat_poll

use std::io::{self, Write};

use gull_client::{AuthorRole, ChatContext, ClientConfig, HttpClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("\n🐦 Interactive Chat Session Client");
    println!("==================================\n");

    let base_url = get_input_with_default("Server URL", "http://localhost:8080");

    println!("\n🔑 Authentication required");
    let username = get_input("Username: ");
    let password = get_input("Password: ");

    let login = HttpClient::new(&ClientConfig::new(&base_url))
        .login(&username, &password)
        .await?;
    println!("✅ Logged in as {} ({})", login.user.username, login.user.role);

    let config = ClientConfig::new(&base_url).with_token(login.token);
    let ctx = ChatContext::new(config);

    // Pick a session from the directory
    let mut directory = ctx.sessions();
    while directory.state().data.is_none() {
        if !directory.changed().await {
            anyhow::bail!("session directory feed stopped");
        }
    }
    for session in directory.sessions() {
        println!("  session {} ({:?})", session.id, session.status);
    }
    let session_id: i64 = get_input("Session id: ").trim().parse()?;

    let mut messages = ctx.messages(Some(session_id));
    let reservations = ctx.reservations(Some(session_id));
    let actions = ctx.actions();

    // Print the log every time it changes
    tokio::spawn(async move {
        let mut last_len = 0;
        loop {
            if !messages.changed().await {
                break;
            }
            let log = messages.messages();
            for message in log.iter().skip(last_len) {
                let who = match message.author {
                    AuthorRole::Customer => "customer",
                    AuthorRole::Bot => "bot",
                    AuthorRole::Staff => "staff",
                    AuthorRole::Unknown => "?",
                };
                println!("[{}] {}", who, message.content);
            }
            last_len = log.len();
            if let Some(error) = messages.error() {
                eprintln!("⚠️ message fetch failed: {}", error);
            }
        }
    });

    println!("\nType a message and press Enter to send ('/close' to close, '/quit' to exit):\n");
    loop {
        let line = get_input("> ");
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" => break,
            "/close" => {
                match actions.close_session(session_id).await {
                    Ok(_) => println!("✅ Session closed"),
                    Err(error) => eprintln!("⚠️ {}", error.notice()),
                }
                break;
            }
            content => {
                if let Err(error) = actions.send_message(session_id, content).await {
                    eprintln!("⚠️ {}", error.notice());
                }
            }
        }
    }

    println!(
        "({} reservation(s) linked to this session)",
        reservations.reservations().len()
    );
    ctx.shutdown();
    Ok(())
}

fn get_input(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().expect("flush stdout");
    let mut input = String::new();
    io::stdin().read_line(&mut input).expect("read stdin");
    input.trim().to_string()
}

fn get_input_with_default(prompt: &str, default: &str) -> String {
    let input = get_input(&format!("{} [{}]: ", prompt, default));
    if input.is_empty() {
        default.to_string()
    } else {
        input
    }
}
