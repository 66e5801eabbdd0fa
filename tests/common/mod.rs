// Scripted audio host shared by the integration tests.
//
// Records every call so tests can assert on exactly what the recorder asked
// the platform to do.

#![allow(dead_code)]

use anyhow::Result;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use voice_memos::audio::{AudioHost, AudioMode, ClipHandle, Permission, RecordingPreset, SessionHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RequestPermission,
    ConfigureMode(AudioMode),
    BeginRecording(RecordingPreset),
    EndRecording(SessionHandle),
    LoadAsset,
    Play(ClipHandle),
    Replay(ClipHandle),
    Release(ClipHandle),
}

/// What `end_recording` should do next
#[derive(Debug, Clone, Copy)]
pub enum EndScript {
    Clip,
    NoClip,
    Fail,
}

#[derive(Default)]
struct Script {
    deny_permission: bool,
    fail_permission: bool,
    fail_begin: bool,
    fail_load: bool,
    fail_replay: bool,
    end_results: VecDeque<EndScript>,
    next_id: u64,
    calls: Vec<Call>,
}

#[derive(Clone, Default)]
pub struct ScriptedHost {
    script: Arc<Mutex<Script>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_permission(&self) {
        self.script.lock().unwrap().deny_permission = true;
    }

    pub fn fail_permission(&self) {
        self.script.lock().unwrap().fail_permission = true;
    }

    pub fn fail_begin(&self) {
        self.script.lock().unwrap().fail_begin = true;
    }

    pub fn fail_load(&self) {
        self.script.lock().unwrap().fail_load = true;
    }

    pub fn fail_replay(&self) {
        self.script.lock().unwrap().fail_replay = true;
    }

    pub fn push_end(&self, result: EndScript) {
        self.script.lock().unwrap().end_results.push_back(result);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().into_iter().filter(|c| pred(c)).count()
    }

    pub fn released(&self) -> Vec<ClipHandle> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Release(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> u64 {
        let mut script = self.script.lock().unwrap();
        script.calls.push(call);
        script.next_id += 1;
        script.next_id
    }
}

#[async_trait::async_trait]
impl AudioHost for ScriptedHost {
    async fn request_microphone_permission(&self) -> Result<Permission> {
        self.record(Call::RequestPermission);
        // Suspend like a real permission prompt would
        tokio::task::yield_now().await;
        let (fail, deny) = {
            let script = self.script.lock().unwrap();
            (script.fail_permission, script.deny_permission)
        };
        if fail {
            anyhow::bail!("permission service unavailable");
        }
        Ok(if deny {
            Permission::Denied
        } else {
            Permission::Granted
        })
    }

    async fn configure_audio_mode(&self, mode: AudioMode) -> Result<()> {
        self.record(Call::ConfigureMode(mode));
        Ok(())
    }

    async fn begin_recording(&self, preset: RecordingPreset) -> Result<SessionHandle> {
        let id = self.record(Call::BeginRecording(preset));
        if self.script.lock().unwrap().fail_begin {
            anyhow::bail!("device busy");
        }
        Ok(SessionHandle::new(id))
    }

    async fn end_recording(&self, session: SessionHandle) -> Result<Option<ClipHandle>> {
        let id = self.record(Call::EndRecording(session));
        let next = self
            .script
            .lock()
            .unwrap()
            .end_results
            .pop_front()
            .unwrap_or(EndScript::Clip);
        match next {
            EndScript::Clip => Ok(Some(ClipHandle::new(id))),
            EndScript::NoClip => Ok(None),
            EndScript::Fail => anyhow::bail!("recorder stopped unexpectedly"),
        }
    }

    async fn load_sound_asset(&self, _asset: &Path) -> Result<ClipHandle> {
        let id = self.record(Call::LoadAsset);
        if self.script.lock().unwrap().fail_load {
            anyhow::bail!("asset missing");
        }
        Ok(ClipHandle::new(id))
    }

    async fn play(&self, clip: ClipHandle) -> Result<()> {
        self.record(Call::Play(clip));
        Ok(())
    }

    async fn replay(&self, clip: ClipHandle) -> Result<()> {
        self.record(Call::Replay(clip));
        if self.script.lock().unwrap().fail_replay {
            anyhow::bail!("sound not loaded");
        }
        Ok(())
    }

    async fn release(&self, clip: ClipHandle) -> Result<()> {
        self.record(Call::Release(clip));
        Ok(())
    }
}
