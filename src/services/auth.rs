use actix_web::{
    Error as ActixError, FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized,
    web::Data,
};
use anyhow::{Result, anyhow};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{
    CreateOrganizationInput, CreateUserInput, User, UserInfo, UserRole,
};
use crate::database::repositories::{OrganizationRepository, UserRepository};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,              // user id
    pub email: String,
    pub organization_id: Uuid,  // tenant scope for every request
    pub role: UserRole,
    pub exp: usize,             // expiration time
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::GlobalAdmin)
    }
    pub fn is_manager(&self) -> bool {
        matches!(self.role, UserRole::Manager | UserRole::TeamLead)
    }
    pub fn is_manager_or_admin(&self) -> bool {
        self.is_manager() || self.is_admin()
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(auth_header) = auth_header {
            if let Ok(auth_str) = auth_header.to_str() {
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    if let Some(config) = req.app_data::<Data<Config>>() {
                        match decode::<Claims>(
                            token,
                            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
                            &Validation::new(Algorithm::HS256),
                        ) {
                            Ok(token_data) => {
                                return ready(Ok(token_data.claims));
                            }
                            Err(_) => {
                                return ready(Err(ErrorUnauthorized("Invalid token")));
                            }
                        }
                    }
                }
            }
        }

        ready(Err(ErrorUnauthorized(
            "Missing or invalid authorization header",
        )))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// Provide a new organization to found it as its admin...
    pub organization: Option<CreateOrganizationInput>,
    /// ...or an existing organization id to join as an employee.
    pub organization_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Clone)]
pub struct AuthService {
    user_repository: UserRepository,
    organization_repository: OrganizationRepository,
    config: Config,
}

impl AuthService {
    pub fn new(
        config: Config,
        user_repository: UserRepository,
        organization_repository: OrganizationRepository,
    ) -> Self {
        Self {
            user_repository,
            organization_repository,
            config,
        }
    }

    pub async fn register(&self, request: RegisterInput) -> Result<AuthResponse> {
        if self.user_repository.email_exists(&request.email).await? {
            return Err(anyhow!("Email already exists"));
        }

        let password_hash = hash(&request.password, DEFAULT_COST)?;

        // Founding a new organization makes the caller its admin;
        // joining an existing one starts them as an employee.
        let (organization_id, role) = match (request.organization, request.organization_id) {
            (Some(org_input), _) => {
                if self
                    .organization_repository
                    .find_by_slug(&org_input.slug)
                    .await?
                    .is_some()
                {
                    return Err(anyhow!("Organization slug already taken"));
                }
                let organization = self.organization_repository.create(org_input).await?;
                (organization.id, UserRole::Admin)
            }
            (None, Some(organization_id)) => {
                self.organization_repository
                    .find_by_id(organization_id)
                    .await?
                    .ok_or_else(|| anyhow!("Organization not found"))?;
                (organization_id, UserRole::Employee)
            }
            (None, None) => {
                return Err(anyhow!(
                    "Either an organization or an organizationId is required"
                ));
            }
        };

        let user = self
            .user_repository
            .create(
                organization_id,
                password_hash,
                CreateUserInput {
                    email: request.email,
                    password: String::new(),
                    first_name: request.first_name,
                    last_name: request.last_name,
                    role: Some(role),
                    department_id: None,
                    manager_id: None,
                    hourly_rate: None,
                },
            )
            .await?;

        let token = self.generate_token(&user)?;

        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    pub async fn login(&self, request: LoginInput) -> Result<AuthResponse> {
        let user = self
            .user_repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| anyhow!("Invalid email or password"))?;

        if !verify(&request.password, &user.password_hash)? {
            return Err(anyhow!("Invalid email or password"));
        }

        if !user.is_active {
            return Err(anyhow!("Account is deactivated"));
        }

        let token = self.generate_token(&user)?;

        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    pub async fn current_user(&self, claims: &Claims) -> Result<Option<User>> {
        self.user_repository.find_by_id(claims.sub).await
    }

    pub fn generate_token(&self, user: &User) -> Result<String> {
        let expiration = Utc::now() + Duration::days(self.config.jwt_expiration_days);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            organization_id: user.organization_id,
            role: user.role,
            exp: expiration.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;

        Ok(token)
    }
}
