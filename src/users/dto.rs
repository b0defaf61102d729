use serde::{Deserialize, Serialize};

/// Body of `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub password: String,
}

/// Body of `PATCH /users/:id`. Every field optional; absent fields are
/// left untouched by the merge.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub password: Option<String>,
}

/// Body of `PUT /users/:id`. A full record; `age` omitted means cleared.
#[derive(Debug, Deserialize)]
pub struct ReplaceUserRequest {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub password: String,
}

/// Body of `POST /users/signin`.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Response of a successful sign-in.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}
