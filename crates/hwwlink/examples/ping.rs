//! Ping a hardware wallet over a hidraw node.
//!
//! Run with:
//!   cargo run --example ping -- /dev/hidraw3
//!
//! Set `HWWLINK_PASSWORD` to send the ping encrypted.

use hwwlink::channel::HidrawChannel;
use hwwlink::device::Communication;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: ping <hidraw device node>")?;

    let comm = Communication::new(HidrawChannel::open(&path)?);
    eprintln!("Opened {path}");

    let reply = match std::env::var("HWWLINK_PASSWORD") {
        Ok(password) => comm.send_encrypted(r#"{"ping":""}"#, &password)?,
        Err(_) => comm.send_plain(r#"{"ping":""}"#)?,
    };
    println!("{}", serde_json::Value::Object(reply));

    comm.close()?;
    Ok(())
}

