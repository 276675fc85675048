#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    shell_app::platform::run_app().await
}
