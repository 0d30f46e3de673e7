//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, configurazioni e stato condiviso
//! necessario per gestire l'applicazione.

use crate::core::{Config, FileStore};
use crate::repositories::{
    CategoryRepository, CertificateRepository, ClientRepository, LookupRepository,
    OrderRepository, PackagingRepository, PasswordResetRepository, ProductRepository,
    QuestionRepository, UserRepository,
};
use sqlx::MySqlPool;

pub const DEFAULT_MIN_ORDER_AMOUNT: f64 = 5000.0;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per clienti, persone fisiche e giuridiche
    pub client: ClientRepository,

    pub product: ProductRepository,

    pub packaging: PackagingRepository,

    pub category: CategoryRepository,

    /// Materiali, unità di misura e forme
    pub lookup: LookupRepository,

    /// Repository per ordini e righe d'ordine
    pub order: OrderRepository,

    pub question: QuestionRepository,

    pub certificate: CertificateRepository,

    pub password_reset: PasswordResetRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,

    pub session_ttl_hours: i64,

    pub password_reset_ttl_minutes: i64,

    /// Aggiunge `Secure` ai cookie (solo in produzione)
    pub secure_cookies: bool,

    /// In produzione il CORS accetta solo `cors_origin`
    pub production: bool,

    /// Origin del frontend ammessa in produzione
    pub cors_origin: Option<String>,

    /// Totale minimo accettato per un ordine
    pub min_order_amount: f64,

    /// Archivio su disco dei file caricati
    pub files: FileStore,

    /// Limite del body delle richieste
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito e la JWT secret.
    /// Gli altri parametri assumono i valori di default.
    pub fn new(pool: MySqlPool, jwt_secret: String) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            client: ClientRepository::new(pool.clone()),
            product: ProductRepository::new(pool.clone()),
            packaging: PackagingRepository::new(pool.clone()),
            category: CategoryRepository::new(pool.clone()),
            lookup: LookupRepository::new(pool.clone()),
            order: OrderRepository::new(pool.clone()),
            question: QuestionRepository::new(pool.clone()),
            certificate: CertificateRepository::new(pool.clone()),
            password_reset: PasswordResetRepository::new(pool),
            jwt_secret,
            session_ttl_hours: 24,
            password_reset_ttl_minutes: 60,
            secure_cookies: false,
            production: false,
            cors_origin: None,
            min_order_amount: DEFAULT_MIN_ORDER_AMOUNT,
            files: FileStore::new("public/uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Stato completo a partire dalla configurazione caricata all'avvio
    pub fn from_config(pool: MySqlPool, config: &Config) -> Self {
        let mut state = Self::new(pool, config.jwt_secret.clone())
            .with_min_order_amount(config.min_order_amount)
            .with_upload_dir(config.upload_dir.clone());
        if config.is_production() {
            state = state.for_production(config.cors_origin.clone());
        }
        state.session_ttl_hours = config.session_ttl_hours;
        state.password_reset_ttl_minutes = config.password_reset_ttl_minutes;
        state.max_upload_bytes = config.max_upload_bytes;
        state
    }

    pub fn with_min_order_amount(mut self, amount: f64) -> Self {
        self.min_order_amount = amount;
        self
    }

    pub fn with_upload_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.files = FileStore::new(dir);
        self
    }

    /// Cookie `Secure` e CORS ristretto all'origin indicata
    pub fn for_production(mut self, cors_origin: Option<String>) -> Self {
        self.production = true;
        self.secure_cookies = true;
        self.cors_origin = cors_origin;
        self
    }
}
