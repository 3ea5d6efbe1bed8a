use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "admin123")]
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    #[schema(example = 28800)]
    pub expires_in: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct ClockInReq {
    #[schema(example = "5f1c8d0e-3a7b-4b1e-9a55-0d8e2c6f4a11")]
    pub employee_id: String,
    #[schema(example = "1234")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub jti: String,
}
