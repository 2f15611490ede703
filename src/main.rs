#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = tutorias::run().await {
        eprintln!("tutorias fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
