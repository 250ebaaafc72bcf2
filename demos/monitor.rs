use std::env;
use std::time::Duration;

use intesis_web::{IntesisClient, RefreshOutcome, SwingOrientation};

#[tokio::main]
async fn main() -> intesis_web::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let (Some(username), Some(password)) = (args.get(1), args.get(2)) else {
        eprintln!("usage: monitor <username> <password> [--vertical]");
        std::process::exit(2);
    };
    let orientation = if args.iter().any(|a| a == "--vertical") {
        SwingOrientation::Vertical
    } else {
        SwingOrientation::Horizontal
    };

    let client = IntesisClient::builder(username.as_str(), password.as_str())
        .swing_orientation(orientation)
        .cache_ttl(Duration::from_secs(30))
        .build()?;

    println!("Logging in...");
    let devices = client.discover().await?;
    println!("Found {} device(s). Polling for updates...", devices.len());

    loop {
        for dev in &devices {
            let temp = dev.current_temperature().await;
            let setpoint = dev.setpoint().await;
            let active = dev.active().await;
            let mode = dev.target_state().await;
            let fan = dev.rotation_speed().await;
            match (temp, setpoint) {
                (Ok(temp), Ok(setpoint)) => println!(
                    "[{}] {:.1}\u{00b0}C / {:.1}\u{00b0}F | target {setpoint} | {:?} | mode: {:?} | fan: {:?}{}",
                    dev.name(),
                    temp.celsius(),
                    temp.fahrenheit(),
                    active.ok(),
                    mode.ok(),
                    fan.ok(),
                    match dev.swing_mode().await {
                        Ok(swing) => format!(" | swing: {swing:?}"),
                        Err(_) => String::new(),
                    },
                ),
                (Err(e), _) | (_, Err(e)) => eprintln!("[{}] read error: {e}", dev.name()),
            }
        }

        tokio::time::sleep(Duration::from_secs(35)).await;
        if let RefreshOutcome::Failed = client.refresh("poll").await {
            eprintln!("Refresh failed; retrying next cycle");
        }
    }
}
