// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Handling of the shared login and sudo password.
//!
//! The password is captured once per run, kept in a `SecretString` and only
//! exposed as a zeroized byte buffer at the moment it is written to a session.

mod credentials;

pub use credentials::{password_from_env, prompt_credentials, Credentials, PASSWORD_ENV_VAR};
