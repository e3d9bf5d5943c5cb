// Stdin preamble for `bash -s` on the sprite
//
// The child reads its whole program from stdin: four exported variables
// followed by the bootstrap script. The user message only ever travels as
// base64 so nothing the user types is interpreted by the remote shell.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::error::TurnError;
use super::types::TurnRequest;

/// Script run on the sprite after the exports.
///
/// Repairs PATH so the npm-installed `openclaw` binary is found, decodes the
/// message and asks for a single non-interactive turn with JSON output.
pub const BOOTSTRAP_SCRIPT: &str = r#"set -euo pipefail

NPM_BIN="$(npm bin -g 2>/dev/null || true)"
NPM_PREFIX="$(npm config get prefix 2>/dev/null || true)"
if [[ -n "$NPM_BIN" && -d "$NPM_BIN" ]]; then export PATH="$NPM_BIN:$PATH"; fi
if [[ -n "$NPM_PREFIX" && -d "$NPM_PREFIX/bin" ]]; then export PATH="$NPM_PREFIX/bin:$PATH"; fi
if [[ -d '/.sprite/languages/node/nvm/versions/node' ]]; then
    NODE_BIN_DIR="$(find /.sprite/languages/node/nvm/versions/node -name 'bin' -type d 2>/dev/null | head -1 || true)"
    [[ -n "$NODE_BIN_DIR" ]] && export PATH="$NODE_BIN_DIR:$PATH"
fi
export PATH="$HOME/.local/bin:$PATH"
hash -r

MSG="$(printf '%s' "$MSG_B64" | base64 -d)"

openclaw agent --local \
  --session-id "$SESSION_ID" \
  --thinking "$THINKING" \
  --timeout "$TIMEOUT" \
  --json \
  --message "$MSG" 2>/dev/null"#;

/// Encode a message the way the bootstrap script expects to decode it
pub fn encode_message(message: &str) -> String {
    STANDARD.encode(message.as_bytes())
}

fn export_line(key: &str, value: &str) -> Result<String, TurnError> {
    let quoted = shlex::try_quote(value).map_err(|_| TurnError::Unquotable {
        key: key.to_string(),
    })?;
    Ok(format!("export {}={}\n", key, quoted))
}

/// Build the full stdin payload for one turn
pub fn build(request: &TurnRequest, script: &str) -> Result<String, TurnError> {
    let mut preamble = String::new();
    preamble.push_str(&export_line("MSG_B64", &encode_message(&request.message))?);
    preamble.push_str(&export_line("SESSION_ID", &request.session_id)?);
    preamble.push_str(&export_line("THINKING", request.thinking.as_str())?);
    preamble.push_str(&export_line("TIMEOUT", &request.timeout_secs.to_string())?);
    preamble.push_str(script);
    preamble.push('\n');
    Ok(preamble)
}
