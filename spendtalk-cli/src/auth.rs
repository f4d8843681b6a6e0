use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::state::ensure_spendtalk_home;

pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthState {
    pub gemini_api_key: Option<String>,
}

fn auth_path() -> Result<PathBuf> {
    Ok(ensure_spendtalk_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    load_auth_from(&auth_path()?)
}

pub fn load_auth_from(p: &Path) -> Result<AuthState> {
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth_to(p: &Path, auth: &AuthState) -> Result<()> {
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// `GEMINI_API_KEY` wins over the stored key.
pub fn gemini_api_key() -> Result<Option<String>> {
    let env = std::env::var(GEMINI_KEY_ENV).ok();
    Ok(pick_key(env, load_auth()?))
}

fn pick_key(env: Option<String>, stored: AuthState) -> Option<String> {
    env.into_iter()
        .chain(stored.gemini_api_key)
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn gemini_paste_key() -> Result<()> {
    let p = auth_path()?;
    let mut auth = load_auth_from(&p)?;
    let key = prompt_secret("Paste Gemini API key (starts with AIza)")?;
    if !key.starts_with("AIza") {
        bail!("key didn't look like a Gemini API key (expected prefix AIza)");
    }
    auth.gemini_api_key = Some(key);
    save_auth_to(&p, &auth)?;
    println!("Saved Gemini API key to {}", p.display());
    Ok(())
}
