//! Loading the product catalog and holding it for the report consumers.
//!
//! The [`CatalogStore`] is the single owner of the in-memory product collection. It is written
//! once by [`CatalogStore::refresh`] and read through shared references by aggregation, chart
//! projection and table rendering.

use log::{error, info};
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::product::{CatalogPage, ProductRecord};

/// Endpoint queried when no other endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://dummyjson.com/products";

/// Errors raised while loading the catalog.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The request did not complete or the body could not be read.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-success status.
    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: String, status: StatusCode },
    /// The body was not a catalog payload.
    #[error("catalog payload could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A place the product collection can be read from.
pub trait ProductSource {
    /// Human-readable origin used in log messages.
    fn describe(&self) -> String;

    /// Performs one read of the catalog.
    fn fetch(&self) -> Result<Vec<ProductRecord>, FetchError>;
}

/// Reads the catalog with a single blocking GET request.
pub struct HttpProductSource {
    client: Client,
    endpoint: String,
}

impl HttpProductSource {
    /// Creates a source for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder().build().map_err(FetchError::Client)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl ProductSource for HttpProductSource {
    fn describe(&self) -> String {
        self.endpoint.clone()
    }

    fn fetch(&self) -> Result<Vec<ProductRecord>, FetchError> {
        let transport = |source| FetchError::Transport {
            endpoint: self.endpoint.clone(),
            source,
        };

        let response = self.client.get(&self.endpoint).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: self.endpoint.clone(),
                status,
            });
        }

        let body = response.text().map_err(transport)?;
        parse_catalog(&body)
    }
}

/// Extracts the ordered product collection from a catalog payload.
pub fn parse_catalog(body: &str) -> Result<Vec<ProductRecord>, FetchError> {
    let page: CatalogPage = serde_json::from_str(body)?;
    if let Some(total) = page.total {
        info!(
            "catalog page holds {} of {} products (skip {}, limit {})",
            page.products.len(),
            total,
            page.skip.unwrap_or_default(),
            page.limit.unwrap_or_default()
        );
    }
    Ok(page.products)
}

/// In-memory product collection with a single writer.
#[derive(Clone, Debug, Default)]
pub struct CatalogStore {
    products: Vec<ProductRecord>,
}

impl CatalogStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding the given records.
    pub fn with_products(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    /// Returns the current collection in catalog order.
    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Replaces the collection with a fresh read from `source`.
    ///
    /// A failed read is logged and leaves the current collection untouched. Returns whether the
    /// collection was replaced.
    pub fn refresh(&mut self, source: &dyn ProductSource) -> bool {
        match source.fetch() {
            Ok(products) => {
                info!(
                    "loaded {} products from {}",
                    products.len(),
                    source.describe()
                );
                self.products = products;
                true
            }
            Err(err) => {
                error!("Error fetching data from {}: {}", source.describe(), err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    struct StaticSource(Vec<ProductRecord>);

    impl ProductSource for StaticSource {
        fn describe(&self) -> String {
            "static".to_string()
        }

        fn fetch(&self) -> Result<Vec<ProductRecord>, FetchError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    impl ProductSource for BrokenSource {
        fn describe(&self) -> String {
            "broken".to_string()
        }

        fn fetch(&self) -> Result<Vec<ProductRecord>, FetchError> {
            parse_catalog("<html>not json</html>")
        }
    }

    #[test]
    fn refresh_replaces_collection() {
        let mut store = CatalogStore::new();
        let source = StaticSource(vec![
            ProductRecord::new(1, "Mascara", "beauty", 9.99),
            ProductRecord::new(2, "Lipstick", "beauty", 12.5),
        ]);

        assert!(store.refresh(&source));
        assert_eq!(store.len(), 2);
        assert_eq!(store.products()[1].title, "Lipstick");
    }

    #[test]
    fn failed_refresh_keeps_previous_collection() {
        let mut store =
            CatalogStore::with_products(vec![ProductRecord::new(7, "Sofa", "furniture", 499.0)]);

        assert!(!store.refresh(&BrokenSource));
        assert_eq!(store.len(), 1);
        assert_eq!(store.products()[0].id, 7);
    }

    #[test]
    fn failed_first_refresh_leaves_store_empty() {
        let mut store = CatalogStore::new();
        assert!(!store.refresh(&BrokenSource));
        assert!(store.is_empty());
    }

    #[test]
    fn parse_catalog_requires_products_field() {
        let err = parse_catalog(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn parse_catalog_preserves_order() {
        let products = parse_catalog(
            r#"{"products": [
                {"id": 3, "title": "C", "category": "x", "price": 1},
                {"id": 1, "title": "A", "category": "y", "price": 2},
                {"id": 2, "title": "B", "category": "x", "price": 3}
            ]}"#,
        )
        .expect("payload parses");
        let ids: Vec<_> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        let source = HttpProductSource::new("http://127.0.0.1:9/products").expect("client builds");
        let err = source.fetch().unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }), "{err}");
    }

    /// Serves one canned HTTP response per connection, in order.
    fn serve(responses: Vec<(&'static str, &'static str)>) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
        let endpoint = format!("http://{}/products", listener.local_addr().expect("local addr"));

        let handle = thread::spawn(move || {
            for (status, body) in responses {
                let (stream, _) = listener.accept().expect("accept connection");
                let mut reader = BufReader::new(&stream);
                let mut line = String::new();
                loop {
                    line.clear();
                    let read = reader.read_line(&mut line).expect("read request");
                    if read == 0 || line == "\r\n" {
                        break;
                    }
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                (&stream)
                    .write_all(response.as_bytes())
                    .expect("write response");
            }
        });
        (endpoint, handle)
    }

    #[test]
    fn http_status_failure_keeps_collection_until_success() {
        let (endpoint, server) = serve(vec![
            ("500 Internal Server Error", r#"{"message": "down"}"#),
            (
                "200 OK",
                r#"{"products": [
                    {"id": 1, "title": "Mascara", "brand": "Essence", "category": "beauty", "price": 9.99},
                    {"id": 16, "title": "Apple", "brand": null, "category": "groceries", "price": 1.99}
                ], "total": 2, "skip": 0, "limit": 30}"#,
            ),
        ]);
        let source = HttpProductSource::new(endpoint).expect("client builds");
        let mut store =
            CatalogStore::with_products(vec![ProductRecord::new(7, "Sofa", "furniture", 499.0)]);

        assert!(!store.refresh(&source));
        assert_eq!(store.len(), 1);
        assert_eq!(store.products()[0].id, 7);

        assert!(store.refresh(&source));
        let ids: Vec<_> = store.products().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 16]);
        assert_eq!(store.products()[1].brand, "");

        server.join().expect("server thread");
    }

    #[test]
    fn non_success_status_is_a_status_error() {
        let (endpoint, server) = serve(vec![("503 Service Unavailable", "")]);
        let source = HttpProductSource::new(endpoint).expect("client builds");

        let err = source.fetch().unwrap_err();
        assert!(
            matches!(&err, FetchError::Status { status, .. } if *status == StatusCode::SERVICE_UNAVAILABLE),
            "{err}"
        );

        server.join().expect("server thread");
    }
}
