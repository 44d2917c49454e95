//! geyser-app: interactive login + web chat echo demo.
//!
//! Reuses the saved session in `geyser.session.json` when it is still valid,
//! otherwise asks for credentials and any CAPTCHA / Steam Guard code.
//!
//!   cargo run -p geyser-app

use std::io::{self, BufRead, Write};

use chrono::{Local, TimeZone};
use geyser_client::{
    ChatError, ChatSession, Client, Config, Message, Prompter, ReqwestTransport,
};

/// Reads challenge answers from the terminal.
struct StdioPrompter;

impl Prompter for StdioPrompter {
    fn status(&self, message: &str) -> io::Result<()> {
        println!("ℹ️  {message}");
        Ok(())
    }

    fn captcha(&self, url: &str) -> io::Result<String> {
        println!("🖼️  Open {url}");
        prompt("CAPTCHA text: ")
    }

    fn guard_code(&self, email_domain: Option<&str>) -> io::Result<String> {
        match email_domain {
            Some(d) => prompt(&format!("Steam Guard code (sent to your {d} address): ")),
            None    => prompt("Steam Guard code: "),
        }
    }
}

#[tokio::main]
async fn main() {
    // Enable logging: RUST_LOG=geyser_client=debug cargo run -p geyser-app
    if std::env::var("RUST_LOG").is_err() {
        // SAFETY: single-threaded at this point, no other threads reading env
        unsafe { std::env::set_var("RUST_LOG", "geyser_client=info,geyser_app=info"); }
    }
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("\n✗ {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new(Config::default())?;

    let mut chat = match client.chat().await {
        Ok(chat) => {
            println!("✅ Already logged in");
            chat
        }
        Err(ChatError::NoAuthToken) => {
            sign_in(&client).await?;
            client.chat().await?
        }
        Err(e) => return Err(e.into()),
    };
    println!("💬 Chat open as {}", chat.steam_id);

    println!("\n👂 Listening for messages (Ctrl+C to quit) …\n");
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        // Dropping an in-flight poll leaves the session counters untouched.
        let batch = tokio::select! {
            _ = &mut ctrl_c => break,
            r = chat.poll() => r,
        };

        match batch {
            Ok(batch) => {
                for msg in &batch.messages {
                    handle(&chat, msg).await;
                }
            }
            Err(e) if e.is_timeout() => continue,
            Err(e) => return Err(e.into()),
        }
    }

    println!("\n👋 Bye");
    Ok(())
}

async fn sign_in(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    let username = prompt("Steam username: ")?;
    print!("Password: ");
    io::stdout().flush()?;
    let password = rpassword::read_password()?;

    let mut login = client.login(&username, &password).await?;
    login.device_name = device_name();
    login.complete_with(&StdioPrompter).await?;
    println!("✅ Signed in as {username}");

    client.save_session()?;
    println!("💾 Session saved");
    Ok(())
}

async fn handle(chat: &ChatSession<ReqwestTransport>, msg: &Message) {
    let when = Local
        .timestamp_opt(msg.header().utc_timestamp as i64, 0)
        .single()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_default();

    match msg {
        Message::Text(t) if !t.echo => {
            println!("📨 [{when}] {}: {}", msg.sender(), t.text);
            if let Err(e) = chat.send(msg.sender(), &format!("Echo: {}", t.text)).await {
                eprintln!("✗ reply failed: {e}");
            }
        }
        Message::Text(t) => println!("📤 [{when}] you: {}", t.text),
        Message::Typing(_) => println!("✏️  {} is typing", msg.sender()),
        Message::PersonaState(p) => println!(
            "👤 {} is now {} (state {})",
            msg.sender(),
            p.persona_name.as_deref().unwrap_or("?"),
            p.persona_state.map_or_else(|| "?".to_string(), |s| s.to_string()),
        ),
        Message::LeftConversation(_) => println!("🚪 {} left the conversation", msg.sender()),
    }
}

/// Name Steam Guard remembers this machine by.
fn device_name() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .filter(|h| !h.trim().is_empty())
        .map_or_else(|| "geyser".to_string(), |h| format!("geyser@{}", h.trim()))
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{msg}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
