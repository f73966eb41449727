#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = uav_sim::run_with_config().await {
        tracing::error!(error = %e, "simulator exited with error");
        std::process::exit(1);
    }
}
