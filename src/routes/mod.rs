/**
 * Routes Module
 * API route handlers
 */

pub mod health;
pub mod posts;
pub mod profiles;
