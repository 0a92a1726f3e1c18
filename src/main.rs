#[actix_web::main]
async fn main() -> std::io::Result<()> {
    feedback_explorer_lib::run().await
}
