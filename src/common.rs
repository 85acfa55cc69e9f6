// Default URLs
pub static DEFAULT_AUTH_URL: &str = "https://auth.sbanken.no";
pub static DEFAULT_API_URL: &str = "https://publicapi.sbanken.no";

// Paths, relative to the base URLs above
pub static TOKEN_PATH: &str = "/identityserver/connect/token";
pub static API_PATH: &str = "/apibeta/api/v1/";
