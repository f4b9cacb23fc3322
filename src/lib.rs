//! # Route Registry
//!
//! Static route registry scanner and semantic component search for
//! React/Next.js app trees.
//!
//! The scanner walks an `app/` directory of `page.tsx` / `route.ts`
//! entry files, extracts the components each route renders and the
//! actions it exposes, and writes one JSON artifact per route. The search
//! side loads those artifacts into an in-memory vector store and answers
//! "which components/routes match this description" queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐
//! │  Discovery   │──▶│   Scanner    │──▶│ JSON artifacts │
//! │ page.tsx ... │   │ tree-sitter  │   │ *.registry.json│
//! └──────────────┘   └──────────────┘   └───────┬────────┘
//!                                               │ load
//!                                               ▼
//!                                      ┌──────────────────┐
//!                                      │ RegistryVector-  │
//!                                      │ Store (top-K)    │
//!                                      └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rreg routes                        # list discovered routes
//! rreg scan                          # scan every route, write artifacts
//! rreg show main/match               # print one artifact
//! rreg search "like a treasure" --target components
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`discovery`] | Route enumeration over the app directory |
//! | [`scanner`] | Component and action extraction |
//! | [`artifact`] | JSON artifact write/load |
//! | [`embedding`] | Vectorizer selection, OpenAI-compatible provider |
//! | [`scan`] | `routes` / `scan` commands |
//! | [`search`] | `search` command |
//! | [`show`] | `show` command |
//!
//! Data models, errors, the hashing vectorizer and the vector store live
//! in the `route-registry-core` crate.

pub mod artifact;
pub mod config;
pub mod discovery;
pub mod embedding;
pub mod scan;
pub mod scanner;
pub mod search;
pub mod show;
