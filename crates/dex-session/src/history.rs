use dex_api_types::{OperationKind, TransactionRecord};
use std::collections::HashMap;

/// Last confirmed transaction per operation kind.
#[derive(Debug, Default)]
pub struct TransactionLog {
    latest: HashMap<OperationKind, TransactionRecord>,
}

impl TransactionLog {
    pub fn record(&mut self, record: TransactionRecord) {
        self.latest.insert(record.kind, record);
    }

    pub fn last(&self, kind: OperationKind) -> Option<&TransactionRecord> {
        self.latest.get(&kind)
    }
}
