use intesis_web::{Characteristic, IntesisClient};

/// Run with: cargo test --test integration -- --ignored
/// Requires a real AC Cloud account:
///   INTESIS_USERNAME=... INTESIS_PASSWORD=... cargo test --test integration -- --ignored
fn live_client() -> IntesisClient {
    let username = std::env::var("INTESIS_USERNAME").expect("INTESIS_USERNAME not set");
    let password = std::env::var("INTESIS_PASSWORD").expect("INTESIS_PASSWORD not set");
    IntesisClient::builder(username, password)
        .build()
        .expect("client build failed")
}

#[tokio::test]
#[ignore]
async fn discover_and_read() {
    let client = live_client();
    let devices = client.discover().await.expect("discover failed");
    assert!(!devices.is_empty(), "account should have at least one unit");

    for dev in &devices {
        let chars = dev.characteristics();
        assert!(chars.contains(&Characteristic::Active));
        let temp = dev.current_temperature().await.expect("temperature read failed");
        assert!(temp.celsius() > -40.0 && temp.celsius() < 60.0);
        println!("{} ({}): {temp}", dev.name(), dev.device_id());
    }
}

#[tokio::test]
#[ignore]
async fn session_survives_invalidation() {
    let client = live_client();
    client.discover().await.expect("discover failed");
    let before = client.session().last_login();

    // Forcing a logged-out session makes the next pass log in again.
    client.session().invalidate();
    client.cache().fetch_all().await.expect("refetch failed");

    assert!(client.session().is_logged_in());
    assert!(client.session().last_login() > before);
}
