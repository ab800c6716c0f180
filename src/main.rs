// Copyright 2025 JiangLong.
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

use clap::Parser;
use flotilla_kube::cli::{commands::Commands, CliArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Initialize tracing
    if args.debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    match args.command {
        Commands::Create(cmd) => cmd.execute().await,
        Commands::Destroy(cmd) => cmd.execute().await,
        Commands::Deploy(cmd) => cmd.execute().await,
        Commands::Load(cmd) => cmd.execute().await,
        Commands::Export(cmd) => cmd.execute().await,
        Commands::List(cmd) => cmd.execute().await,
    }
}
