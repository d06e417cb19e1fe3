// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowGPT-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of FlowGPT and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! FlowGPT CLI entrypoint.
//!
//! Serves the generation and document API at `http://127.0.0.1:<port>/api/...`
//! against a session directory. The completion API key comes from
//! `OPENAI_API_KEY`; without it the server still runs, with the LLM-backed
//! request types disabled.

use std::error::Error;

use flowgpt::api::{router, ApiState};
use flowgpt::llm::{CompletionClient, LlmConfig, LlmError};
use flowgpt::store::{SessionFolder, WriteDurability};

const DEFAULT_HTTP_PORT: u16 = 27517;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<session-dir>] [--port <port>] [--model <model>] [--durable-writes]\n  {program} [--session <dir>] [--port <port>] [--model <model>] [--durable-writes]\n\nServes the FlowGPT API at `http://127.0.0.1:<port>` (0 = ephemeral; default {DEFAULT_HTTP_PORT}).\n\nIf session-dir/--session is omitted, the current working directory is used.\n--model overrides the completion model (default from FLOWGPT_LLM_MODEL or gpt-4o).\n--durable-writes opts into slower, best-effort durable persistence (fsync where supported)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    session_dir: Option<String>,
    port: Option<u16>,
    model: Option<String>,
    durable_writes: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--session" => {
                if options.session_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.session_dir = Some(dir);
            }
            "--port" => {
                if options.port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.port = Some(port);
            }
            "--model" => {
                if options.model.is_some() {
                    return Err(());
                }
                let model = args.next().ok_or(())?;
                options.model = Some(model);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.session_dir.is_some() {
                    return Err(());
                }
                options.session_dir = Some(arg);
            }
        }
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "flowgpt".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let dir = options.session_dir.unwrap_or_else(|| ".".to_owned());
        let folder = if options.durable_writes {
            SessionFolder::new(dir).with_durability(WriteDurability::Durable)
        } else {
            SessionFolder::new(dir)
        };
        let session = folder.load_or_init_session()?;

        let llm = match LlmConfig::from_env() {
            Ok(config) => {
                let config = match options.model {
                    Some(model) => config.with_model(model),
                    None => config,
                };
                Some(CompletionClient::new(config)?)
            }
            Err(LlmError::MissingApiKey) => {
                eprintln!(
                    "flowgpt: OPENAI_API_KEY is not set; generation requests will be rejected"
                );
                None
            }
            Err(err) => return Err(Box::new(err)),
        };

        let mut state = ApiState::new(session).with_folder(folder);
        if let Some(client) = llm {
            state = state.with_llm(client);
        }

        let port = options.port.unwrap_or(DEFAULT_HTTP_PORT);
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
            let local_addr = listener.local_addr()?;
            eprintln!("flowgpt: serving API at http://{local_addr}/api/generate-flowchart");

            axum::serve(listener, router(state)).await?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("flowgpt: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_positional_session_dir() {
        let options = parse_options(["some/dir".to_owned()].into_iter()).expect("parse options");
        assert_eq!(options.session_dir.as_deref(), Some("some/dir"));
        assert_eq!(options.port, None);
    }

    #[test]
    fn parses_session_flag() {
        let options = parse_options(["--session".to_owned(), "some/dir".to_owned()].into_iter())
            .expect("parse options");
        assert_eq!(options.session_dir.as_deref(), Some("some/dir"));
    }

    #[test]
    fn parses_port_and_model() {
        let options = parse_options(
            ["--port".to_owned(), "1234".to_owned(), "--model".to_owned(), "gpt-4o-mini".to_owned()]
                .into_iter(),
        )
        .expect("parse options");
        assert_eq!(options.port, Some(1234));
        assert_eq!(options.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn parses_durable_writes() {
        let options =
            parse_options(["--durable-writes".to_owned()].into_iter()).expect("parse options");
        assert!(options.durable_writes);
    }

    #[test]
    fn rejects_unknown_flags() {
        parse_options(["--nope".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags_and_dirs() {
        parse_options(["--port".to_owned(), "1".to_owned(), "--port".to_owned(), "2".to_owned()].into_iter())
            .unwrap_err();
        parse_options(["one".to_owned(), "two".to_owned()].into_iter()).unwrap_err();
        parse_options(
            ["--session".to_owned(), "a".to_owned(), "b".to_owned()].into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_missing_values() {
        parse_options(["--session".to_owned()].into_iter()).unwrap_err();
        parse_options(["--port".to_owned()].into_iter()).unwrap_err();
        parse_options(["--port".to_owned(), "notaport".to_owned()].into_iter()).unwrap_err();
        parse_options(["--model".to_owned()].into_iter()).unwrap_err();
    }
}
