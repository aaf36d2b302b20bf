use std::collections::HashMap;
use std::sync::Mutex;
use async_trait::async_trait;
use blob_store::{CompletedPart, MultipartSession, ObjectResult, ObjectStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(usize),
    Start,
    Part { number: u32, len: usize },
    Complete(Vec<CompletedPart>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Start,
    Part,
    Complete,
}

/// In-memory store that records every call and fails the first N calls of an operation.
#[derive(Debug, Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Op, u32>>,
}

impl RecordingStore {
    pub fn failing(op: Op, times: u32) -> Self {
        let store = Self::default();
        store.failures.lock().unwrap().insert(op, times);
        store
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: Op, call: Call) -> ObjectResult<()> {
        self.calls.lock().unwrap().push(call);
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(format!("{:?} rejected", op).into())
            }
            _ => Ok(()),
        }
    }

    fn count(&self, op: Op) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| match (op, call) {
                (Op::Create, Call::Create(_)) => true,
                (Op::Start, Call::Start) => true,
                (Op::Part, Call::Part { .. }) => true,
                (Op::Complete, Call::Complete(_)) => true,
                _ => false,
            })
            .count()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn create_object(&self, data: &[u8]) -> ObjectResult<String> {
        self.record(Op::Create, Call::Create(data.len()))?;
        Ok(format!("key-{}", self.count(Op::Create)))
    }

    async fn start_multipart_upload(&self) -> ObjectResult<MultipartSession> {
        self.record(Op::Start, Call::Start)?;
        let n = self.count(Op::Start);
        Ok(MultipartSession {
            object_id: format!("obj-{}", n),
            upload_id: format!("up-{}", n),
        })
    }

    async fn upload_part(
        &self,
        _session: &MultipartSession,
        part_number: u32,
        data: &[u8],
    ) -> ObjectResult<String> {
        self.record(Op::Part, Call::Part { number: part_number, len: data.len() })?;
        Ok(format!("e{}", part_number))
    }

    async fn complete_multipart_upload(
        &self,
        session: &MultipartSession,
        parts: &[CompletedPart],
    ) -> ObjectResult<String> {
        self.record(Op::Complete, Call::Complete(parts.to_vec()))?;
        Ok(session.object_id.clone())
    }
}
