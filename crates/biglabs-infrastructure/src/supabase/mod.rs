//! Supabase-backed collaborators.
//!
//! - `http`: shared REST plumbing (headers, error mapping)
//! - `dto`: GoTrue request/response bodies
//! - `auth_client`: `RemoteAuthClient` over the GoTrue auth API
//! - `profile_repository`: `ProfileRepository` over the PostgREST `profiles` table

mod auth_client;
mod dto;
mod http;
mod profile_repository;

pub use auth_client::SupabaseAuthClient;
pub use http::SupabaseHttp;
pub use profile_repository::SupabaseProfileRepository;
