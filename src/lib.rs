//! Library crate for gameboxd-back: a game journaling backend that mirrors an
//! external game catalog locally and layers ratings, reviews, lists and a
//! follower graph on top of it.

pub mod catalog;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
