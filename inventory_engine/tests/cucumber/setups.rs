use cucumber::given;
use inventory_engine::db_types::{NewProduct, Price};

use crate::cucumber::{InventorySystem, InventoryWorld};

#[given("a fresh inventory")]
async fn fresh_database(world: &mut InventoryWorld) {
    let system = InventorySystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a product with sku '{word}' and stock {int}")]
async fn product_with_stock(world: &mut InventoryWorld, sku: String, stock: i64) {
    let product = NewProduct::new(sku, "Test product", Price::from(999), stock);
    world.system().products.create_product(product).await.expect("Error creating product");
}
