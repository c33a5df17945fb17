#[tokio::main]
async fn main() {
    louies_library::start_server().await;
}
