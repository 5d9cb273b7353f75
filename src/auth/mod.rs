//
//  zentao-gateway
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/07/21.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Token-based authentication for the ZenTao gateway. ZenTao's REST API
//! uses short-lived session tokens obtained by POSTing account credentials
//! to a token endpoint; every subsequent request carries the token in a
//! fixed header.
//!
//! ## Module Structure
//!
//! - [`token`]: credential cache, TTL expiry and the login flow
//!
//! ## Example
//!
//! ```rust,no_run
//! use zentao_gateway::auth::TokenManager;
//! use zentao_gateway::GatewayConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GatewayConfig::new("https://zentao.example.com")
//!     .with_credentials("bot", "secret");
//! let http = reqwest::Client::new();
//! let manager = TokenManager::new();
//!
//! let (token, source) = manager.get_token(&http, &config, false).await?;
//! println!("token obtained via {:?}: {} chars", source, token.len());
//! # Ok(())
//! # }
//! ```

mod token;

pub use token::*;
