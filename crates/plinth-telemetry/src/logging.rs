// Copyright 2025 eraflo
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

//! Process-wide logger bootstrap.

use env_logger::{Builder, Env};

/// Filter used when `RUST_LOG` is unset. The GPU stack is chatty at
/// `info`, so its crates are capped.
pub const DEFAULT_LOG_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=error,naga=warn";

/// Installs `env_logger` as the global logger.
///
/// `RUST_LOG` replaces [`DEFAULT_LOG_FILTER`] entirely when set. Calling this
/// twice is harmless: the second call only logs a warning.
pub fn init_logging() {
    let result = Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .format_timestamp_millis()
        .try_init();
    if let Err(e) = result {
        log::warn!("Logger already initialized: {e}");
    }
}
