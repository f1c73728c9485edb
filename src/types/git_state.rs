use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    error::{Error, Result},
    header::EventCode,
    priority::Severity,
    provider::{PayloadCodec, PayloadProvider},
    utils::varint::{get_varint, put_varint, MAX_VAR_UINT_SIZE},
};

pub const GIT_STATE_EVENT_CODE: EventCode = 0x0042;

const CRC_SIZE: usize = 4;

/// Repository state recorded when an application starts: which repository,
/// at which commit, and whether the working tree had local modifications.
///
/// Payload format:
///
/// ```text
///   +---------------------------------------------+
///   | name len: varint | repo name bytes          |
///   +---------------------------------------------+
///   | sha1 len: varint | sha1 bytes               |
///   +---------------------------------------------+
///   | modified: 1 byte | crc32 (le): 4 bytes      |
///   +---------------------------------------------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitState {
    repo_name: String,
    sha1: String,
    modified: bool,
}

impl GitState {
    pub fn new(repo_name: impl Into<String>, sha1: impl Into<String>, modified: bool) -> Self {
        Self {
            repo_name: repo_name.into(),
            sha1: sha1.into(),
            modified,
        }
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    pub fn sha1(&self) -> &str {
        &self.sha1
    }

    pub fn modified(&self) -> bool {
        self.modified
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(
            2 * MAX_VAR_UINT_SIZE + self.repo_name.len() + self.sha1.len() + 1 + CRC_SIZE,
        );
        put_varint(self.repo_name.len() as u64, &mut buf);
        buf.put(self.repo_name.as_bytes());
        put_varint(self.sha1.len() as u64, &mut buf);
        buf.put(self.sha1.as_bytes());
        buf.put_u8(self.modified as u8);
        let crc = crc32fast::hash(buf.as_ref());
        buf.put_u32_le(crc);
        buf.freeze()
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < CRC_SIZE {
            return Err(Error::PayloadCorrupted("git state payload too short".into()));
        }
        let (body, mut tail) = payload.split_at(payload.len() - CRC_SIZE);
        let crc = tail.get_u32_le();
        let calc_crc = crc32fast::hash(body);
        if crc != calc_crc {
            return Err(Error::PayloadCorrupted(format!(
                "crc not equal, expect: {}, calc: {}",
                crc, calc_crc
            )));
        }

        let mut ptr = body;
        let repo_name = get_string(&mut ptr)?;
        let sha1 = get_string(&mut ptr)?;
        if ptr.len() != 1 {
            return Err(Error::PayloadCorrupted(format!(
                "expected 1 flag byte, found {}",
                ptr.len()
            )));
        }
        let modified = match ptr.get_u8() {
            0 => false,
            1 => true,
            v => {
                return Err(Error::PayloadCorrupted(format!(
                    "invalid modified flag: {}",
                    v
                )))
            }
        };

        Ok(Self {
            repo_name,
            sha1,
            modified,
        })
    }
}

fn get_string(ptr: &mut &[u8]) -> Result<String> {
    let len = get_varint(ptr)?;
    let len = usize::try_from(len)
        .ok()
        .filter(|l| *l <= ptr.len())
        .ok_or_else(|| Error::PayloadCorrupted(format!("string length {} out of range", len)))?;
    let s = std::str::from_utf8(&ptr[..len])
        .map_err(|e| Error::PayloadCorrupted(e.to_string()))?
        .to_string();
    ptr.advance(len);
    Ok(s)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GitStateProvider;

impl PayloadProvider for GitStateProvider {
    fn event_code(&self) -> EventCode {
        GIT_STATE_EVENT_CODE
    }

    fn name(&self) -> &str {
        "git_state"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn verify(&self, payload: &[u8]) -> bool {
        self.decode(payload).is_ok()
    }

    fn msg_string(&self, payload: &[u8]) -> Result<String> {
        let gs = self.decode(payload)?;
        let mut s = format!("{} GIT: {}", gs.repo_name, gs.sha1);
        if gs.modified {
            s.push_str(" MODIFIED");
        }
        Ok(s)
    }
}

impl PayloadCodec for GitStateProvider {
    type Message = GitState;

    fn encode(&self, msg: &GitState) -> Bytes {
        msg.encode()
    }

    fn decode(&self, payload: &[u8]) -> Result<GitState> {
        GitState::decode(payload)
    }
}
