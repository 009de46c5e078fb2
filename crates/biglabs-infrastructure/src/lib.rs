pub mod config_service;
pub mod paths;
pub mod secret_service;
pub mod storage;
pub mod supabase;

pub use crate::config_service::ConfigService;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::supabase::{SupabaseAuthClient, SupabaseHttp, SupabaseProfileRepository};
