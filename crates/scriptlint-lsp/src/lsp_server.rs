//! A small LSP endpoint which lints open documents.
//!
//! Handled methods:
//!
//! | Method | Effect |
//! |---|---|
//! | `initialize` | replies with capabilities (full and incremental sync) |
//! | `initialized` | nothing |
//! | `textDocument/didOpen` | stores the document, publishes diagnostics |
//! | `textDocument/didChange` | applies full or ranged changes, publishes diagnostics |
//! | `textDocument/didClose` | forgets the document, publishes an empty list |
//! | `shutdown` | replies `null` |
//! | `exit` | stops [`LintingLspServer::run`] |
//!
//! Other requests get a `MethodNotFound` error; other notifications are ignored.

use crate::error::LspError;
use crate::lsp_diag_reporter::{LspDiagReporter, LspDiagnostic};
use crate::lsp_locator::{LspDocumentText, LspRange};
use crate::lsp_transport::read_lsp_message;
use crate::outgoing_queue::{LspWriterRemote, OutgoingJsonRpcMessageQueue};
use scriptlint_core::{Configuration, DiagList, PaddedString, Translator, parse_and_lint};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{BufRead, Write};

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// `TextDocumentSyncKind.Incremental`.
const SYNC_INCREMENTAL: u8 = 2;

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct Response<'a, T: Serialize> {
    jsonrpc: &'static str,
    id: &'a Value,
    result: T,
}

#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    jsonrpc: &'static str,
    id: &'a Value,
    error: ResponseError,
}

#[derive(Debug, Serialize)]
struct ResponseError {
    code: i32,
    message: String,
}

#[derive(Debug, Serialize)]
struct Notification<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
}

#[derive(Debug, Serialize)]
struct PublishDiagnosticsParams<'a> {
    uri: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<i64>,
    diagnostics: Vec<LspDiagnostic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    initialization_options: Option<InitializationOptions>,
}

#[derive(Debug, Deserialize)]
struct InitializationOptions {
    /// Linter configuration, in the same shape as a configuration file.
    #[serde(default)]
    configuration: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DidOpenParams {
    text_document: TextDocumentItem,
}

#[derive(Debug, Deserialize)]
struct TextDocumentItem {
    uri: String,
    #[serde(default)]
    version: Option<i64>,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DidChangeParams {
    text_document: VersionedTextDocumentIdentifier,
    content_changes: Vec<ContentChange>,
}

#[derive(Debug, Deserialize)]
struct VersionedTextDocumentIdentifier {
    uri: String,
    #[serde(default)]
    version: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ContentChange {
    #[serde(default)]
    range: Option<LspRange>,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DidCloseParams {
    text_document: TextDocumentIdentifier,
}

#[derive(Debug, Deserialize)]
struct TextDocumentIdentifier {
    uri: String,
}

struct OpenDocument {
    text: LspDocumentText,
    version: Option<i64>,
}

/// Lints documents the client opens and publishes the results.
pub struct LintingLspServer {
    documents: HashMap<String, OpenDocument>,
    config: Configuration,
    translator: Translator,
    outgoing: OutgoingJsonRpcMessageQueue,
    shutdown_requested: bool,
    exited: bool,
}

impl Default for LintingLspServer {
    fn default() -> Self {
        Self::new()
    }
}

impl LintingLspServer {
    /// Server with the default configuration and untranslated messages.
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            config: Configuration::default(),
            translator: Translator::new(),
            outgoing: OutgoingJsonRpcMessageQueue::new(),
            shutdown_requested: false,
            exited: false,
        }
    }

    /// Whether the client sent `exit`.
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    /// Whether the client sent `shutdown`.
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Messages produced by handlers and not yet sent.
    pub fn outgoing(&mut self) -> &mut OutgoingJsonRpcMessageQueue {
        &mut self.outgoing
    }

    /// Handle one JSON-RPC message body. Replies and notifications are queued.
    pub fn handle_message(&mut self, body: &[u8]) -> Result<(), LspError> {
        let message: IncomingMessage = match serde_json::from_slice(body) {
            Ok(message) => message,
            Err(error) => {
                tracing::debug!(%error, "malformed LSP message");
                let code = if error.is_data() {
                    INVALID_REQUEST
                } else {
                    PARSE_ERROR
                };
                return self.queue_error(&Value::Null, code, error.to_string());
            }
        };
        let Some(method) = message.method else {
            // A response to a request we never sent.
            tracing::debug!(id = ?message.id, "ignoring LSP response");
            return Ok(());
        };
        tracing::trace!(%method, "received LSP message");

        match (method.as_str(), message.id) {
            ("initialize", Some(id)) => self.handle_initialize(&id, message.params),
            ("shutdown", Some(id)) => {
                self.shutdown_requested = true;
                self.queue_response(&id, Value::Null)
            }
            ("initialized", None) => Ok(()),
            ("exit", None) => {
                self.exited = true;
                Ok(())
            }
            ("textDocument/didOpen", None) => {
                let params: DidOpenParams = serde_json::from_value(message.params)?;
                self.did_open(params)
            }
            ("textDocument/didChange", None) => {
                let params: DidChangeParams = serde_json::from_value(message.params)?;
                self.did_change(params)
            }
            ("textDocument/didClose", None) => {
                let params: DidCloseParams = serde_json::from_value(message.params)?;
                self.did_close(params)
            }
            (_, Some(id)) => {
                tracing::debug!(%method, "unsupported LSP request");
                self.queue_error(&id, METHOD_NOT_FOUND, format!("unsupported method: {method}"))
            }
            (_, None) => {
                tracing::debug!(%method, "ignoring LSP notification");
                Ok(())
            }
        }
    }

    /// Serve `reader` until `exit` or end of input, writing framed messages to `writer`.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        reader: &mut R,
        writer: W,
    ) -> Result<(), LspError> {
        let mut remote = LspWriterRemote::new(writer);
        while !self.exited {
            let Some(body) = read_lsp_message(reader)? else {
                tracing::debug!("LSP input closed");
                break;
            };
            if let Err(error) = self.handle_message(&body) {
                tracing::warn!(%error, "failed to handle LSP message");
            }
            self.outgoing.send(&mut remote)?;
        }
        Ok(())
    }

    fn handle_initialize(&mut self, id: &Value, params: Value) -> Result<(), LspError> {
        let params: InitializeParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(error) => return self.queue_error(id, INVALID_PARAMS, error.to_string()),
        };
        if let Some(locale) = params.locale {
            self.translator = Translator::for_locale(&locale);
        }
        if let Some(configuration) = params
            .initialization_options
            .and_then(|options| options.configuration)
        {
            self.load_configuration(&configuration)?;
        }
        self.queue_response(
            id,
            json!({
                "capabilities": {
                    "textDocumentSync": {
                        "openClose": true,
                        "change": SYNC_INCREMENTAL,
                    },
                },
                "serverInfo": {
                    "name": "scriptlint",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )
    }

    fn load_configuration(&mut self, configuration: &Value) -> Result<(), LspError> {
        let text = PaddedString::new(&serde_json::to_vec(configuration)?);
        let mut diags = DiagList::new();
        self.config.load_from_json(text.view(), &mut diags);
        if !diags.is_empty() {
            tracing::debug!(
                diagnostics = diags.len(),
                "configuration has errors; invalid parts ignored"
            );
        }
        Ok(())
    }

    fn did_open(&mut self, params: DidOpenParams) -> Result<(), LspError> {
        let item = params.text_document;
        self.documents.insert(
            item.uri.clone(),
            OpenDocument {
                text: LspDocumentText::new(item.text.as_bytes()),
                version: item.version,
            },
        );
        self.publish_diagnostics(&item.uri)
    }

    fn did_change(&mut self, params: DidChangeParams) -> Result<(), LspError> {
        let uri = params.text_document.uri;
        let Some(document) = self.documents.get_mut(&uri) else {
            tracing::debug!(%uri, "change for a document which is not open");
            return Ok(());
        };
        for change in params.content_changes {
            match change.range {
                Some(range) => document.text.replace_text(range, change.text.as_bytes()),
                None => document.text.set_text(change.text.as_bytes()),
            }
        }
        document.version = params.text_document.version;
        self.publish_diagnostics(&uri)
    }

    fn did_close(&mut self, params: DidCloseParams) -> Result<(), LspError> {
        let uri = params.text_document.uri;
        if self.documents.remove(&uri).is_some() {
            self.queue_notification(
                "textDocument/publishDiagnostics",
                PublishDiagnosticsParams {
                    uri: &uri,
                    version: None,
                    diagnostics: Vec::new(),
                },
            )?;
        }
        Ok(())
    }

    fn publish_diagnostics(&mut self, uri: &str) -> Result<(), LspError> {
        let Some(document) = self.documents.get(uri) else {
            return Ok(());
        };
        let mut reporter =
            LspDiagReporter::new(self.translator, document.text.locator(), Some(uri));
        parse_and_lint(document.text.view(), &mut reporter, self.config.globals());
        let diagnostics = reporter.finish();
        tracing::debug!(%uri, diagnostics = diagnostics.len(), "publishing diagnostics");
        let version = document.version;
        self.queue_notification(
            "textDocument/publishDiagnostics",
            PublishDiagnosticsParams {
                uri,
                version,
                diagnostics,
            },
        )
    }

    fn queue_response(&mut self, id: &Value, result: impl Serialize) -> Result<(), LspError> {
        let response = Response {
            jsonrpc: "2.0",
            id,
            result,
        };
        serde_json::to_writer(self.outgoing.new_message(), &response)?;
        Ok(())
    }

    fn queue_error(&mut self, id: &Value, code: i32, message: String) -> Result<(), LspError> {
        let response = ErrorResponse {
            jsonrpc: "2.0",
            id,
            error: ResponseError { code, message },
        };
        serde_json::to_writer(self.outgoing.new_message(), &response)?;
        Ok(())
    }

    fn queue_notification(
        &mut self,
        method: &str,
        params: impl Serialize,
    ) -> Result<(), LspError> {
        let notification = Notification {
            jsonrpc: "2.0",
            method,
            params,
        };
        serde_json::to_writer(self.outgoing.new_message(), &notification)?;
        Ok(())
    }
}
