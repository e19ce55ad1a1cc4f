//! `ApiClient`, catalog and order management against the fake API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use lapak_core::{Order, OrderId, OrderStatus, Price, ProductDraft, ProductDraftError, ProductId};
use lapak_integration_tests::{FakeApi, product};
use lapak_storefront::api::{ApiClient, ApiError};
use lapak_storefront::catalog::{Catalog, CatalogError};
use lapak_storefront::orders::{OrderError, Orders};
use secrecy::SecretString;

fn order(id: &str, status: OrderStatus) -> Order {
    Order {
        id: OrderId::new(id),
        customer_name: "Siti".to_string(),
        items: Vec::new(),
        total_price: Price::new(50000),
        status,
        created_at: None,
    }
}

fn draft(name: &str, price: u64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        price: Price::new(price),
        image: "file:///data/user/0/lapak/cache/foto.jpg".to_string(),
        description: String::new(),
        category: String::new(),
    }
}

#[tokio::test]
async fn test_products_by_category() {
    let fake = FakeApi::spawn().await;
    fake.insert_product(product("1", "Kopi Arabika Gayo", 75000, "Minuman"));
    fake.insert_product(product("2", "Keripik Pisang Coklat", 15000, "Makanan"));
    fake.insert_product(product("3", "Es Teh Manis", 5000, "Minuman"));
    let catalog = Catalog::new(ApiClient::new(&fake.api_config()).unwrap());

    assert_eq!(catalog.products(None).await.unwrap().len(), 3);

    let drinks = catalog.products(Some("Minuman")).await.unwrap();
    let names: Vec<&str> = drinks.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Kopi Arabika Gayo", "Es Teh Manis"]);

    assert!(catalog.products(Some("Kerajinan")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let fake = FakeApi::spawn().await;
    let catalog = Catalog::new(ApiClient::new(&fake.api_config()).unwrap());

    let err = catalog.product(&ProductId::new("ghost")).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(ref id) if id.as_str() == "ghost"));

    let err = catalog.delete(&ProductId::new("ghost")).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[tokio::test]
async fn test_product_list_is_cached_until_a_write() {
    let fake = FakeApi::spawn().await;
    fake.insert_product(product("1", "Kopi Arabika Gayo", 75000, "Minuman"));
    let catalog = Catalog::new(ApiClient::new(&fake.api_config()).unwrap());

    assert_eq!(catalog.products(None).await.unwrap().len(), 1);

    // Changed behind the client's back: still served from cache
    fake.insert_product(product("2", "Keripik Pisang Coklat", 15000, "Makanan"));
    assert_eq!(catalog.products(None).await.unwrap().len(), 1);

    // A write through the client invalidates
    catalog.create(draft("Pisang Nugget", 20000)).await.unwrap();
    assert_eq!(catalog.products(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_create_update_delete_product() {
    let fake = FakeApi::spawn().await;
    let catalog = Catalog::new(ApiClient::new(&fake.api_config()).unwrap());

    let created = catalog.create(draft("  Pisang Nugget ", 20000)).await.unwrap();
    assert_eq!(created.name, "Pisang Nugget");
    assert_eq!(created.description, "Deskripsi standar UMKM");
    assert_eq!(created.category, "Makanan");

    let mut edit = ProductDraft::from(&created);
    edit.price = Price::new(22000);
    edit.category = "Kerajinan".to_string();
    let updated = catalog.update(&created.id, edit).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.price, Price::new(22000));
    assert_eq!(fake.products()[0].category, "Kerajinan");

    catalog.delete(&created.id).await.unwrap();
    assert!(fake.products().is_empty());
    assert!(catalog.products(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_draft_sends_nothing() {
    let fake = FakeApi::spawn().await;
    let catalog = Catalog::new(ApiClient::new(&fake.api_config()).unwrap());

    let err = catalog.create(draft("Gratisan", 0)).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::InvalidDraft(ProductDraftError::MissingPrice)
    ));
    assert!(fake.products().is_empty());
    assert!(fake.authorization_headers().is_empty());
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let fake = FakeApi::spawn().await;
    let api = ApiClient::new(&fake.api_config()).unwrap();

    api.list_products().await.unwrap();
    api.set_token(Some(SecretString::from("k8Jx2mQ9vLr4")));
    api.invalidate_products().await;
    api.list_products().await.unwrap();

    assert_eq!(
        fake.authorization_headers(),
        [None, Some("Bearer k8Jx2mQ9vLr4".to_string())]
    );
}

#[tokio::test]
async fn test_orders_newest_first_and_status_transitions() {
    let fake = FakeApi::spawn().await;
    fake.insert_order(order("665f00000000abc01", OrderStatus::New));
    fake.insert_order(order("665f00000000abc02", OrderStatus::Done));
    let orders = Orders::new(ApiClient::new(&fake.api_config()).unwrap());

    assert_eq!(orders.list().await.unwrap().len(), 2);

    let id = OrderId::new("665f00000000abc01");
    let moved = orders.set_status(&id, OrderStatus::Processing).await.unwrap();
    assert_eq!(moved.status, OrderStatus::Processing);
    assert_eq!(fake.orders()[0].status, OrderStatus::Processing);

    // Backwards is rejected locally
    let err = orders.set_status(&id, OrderStatus::New).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { .. }));
    assert_eq!(fake.orders()[0].status, OrderStatus::Processing);

    // Finished orders stay finished
    let done = OrderId::new("665f00000000abc02");
    let err = orders.set_status(&done, OrderStatus::Processing).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition { from: OrderStatus::Done, .. }
    ));

    let err = orders
        .set_status(&OrderId::new("missing"), OrderStatus::Done)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound(_)));
}

#[tokio::test]
async fn test_server_down_is_http_error() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = lapak_storefront::config::ApiConfig::new(
        url::Url::parse(&format!("http://{addr}")).unwrap(),
    );
    let api = ApiClient::new(&config).unwrap();
    let err = api.list_orders().await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)));
    assert!(err.is_server_side());
}
