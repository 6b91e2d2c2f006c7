//! User management for the finance manager.
//!
//! This module contains everything related to users:
//! - The `User` model and the validation of new users
//! - Database functions for storing, listing and deleting users
//! - Route handlers for the user endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;

pub use core::{
    CreateUserRequest, NewUser, User, UserID, UserName, create_user, create_user_table,
    delete_user, get_users,
};
pub use create_endpoint::create_user_endpoint;
pub use delete_endpoint::delete_user_endpoint;
pub use list_endpoint::list_users_endpoint;
