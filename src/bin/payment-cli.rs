use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use payment_simulator::{PaymentRequest, Response};

#[derive(Parser)]
#[command(name = "payment-cli")]
#[command(about = "Send PAYMENT requests to a running simulator", long_about = None)]
struct Cli {
    /// Simulator address.
    #[arg(short, long, default_value = "localhost:11111")]
    addr: String,

    /// Amounts to send, one request each, over a single connection.
    #[arg(required = true, allow_negative_numbers = true)]
    amounts: Vec<i64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let stream = TcpStream::connect(&cli.addr).await?;
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    for amount in cli.amounts {
        let request = PaymentRequest::new(amount);
        writer.write_all(format!("{request}\n").as_bytes()).await?;

        let Some(line) = lines.next_line().await? else {
            eprintln!("Error: connection closed before a response to {request}");
            std::process::exit(1);
        };

        match line.parse::<Response>() {
            Ok(response) => println!("{request} -> {} {}", response.status, response.reason),
            Err(e) => eprintln!("Error: unexpected reply {line:?}: {e}"),
        }
    }

    Ok(())
}
