pub async fn get_index_route() -> &'static str {
    "✅ Student CRUD API is running!"
}
