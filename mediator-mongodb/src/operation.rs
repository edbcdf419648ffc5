/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// What a `mongodb:` producer does with each exchange.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MongoOperation {
    Count,
    FindAll,
    FindById,
    FindOneByQuery,
    Insert,
    Save,
    Remove,
    GetDbStats,
}

impl MongoOperation {
    pub const ALL: [MongoOperation; 8] = [
        MongoOperation::Count,
        MongoOperation::FindAll,
        MongoOperation::FindById,
        MongoOperation::FindOneByQuery,
        MongoOperation::Insert,
        MongoOperation::Save,
        MongoOperation::Remove,
        MongoOperation::GetDbStats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MongoOperation::Count => "count",
            MongoOperation::FindAll => "findAll",
            MongoOperation::FindById => "findById",
            MongoOperation::FindOneByQuery => "findOneByQuery",
            MongoOperation::Insert => "insert",
            MongoOperation::Save => "save",
            MongoOperation::Remove => "remove",
            MongoOperation::GetDbStats => "getDbStats",
        }
    }

    /// Database-level operations work without a `collection` parameter.
    pub fn requires_collection(&self) -> bool {
        !matches!(self, MongoOperation::GetDbStats)
    }

    /// Operations that report `mongodb.recordsAffected`.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            MongoOperation::Insert | MongoOperation::Save | MongoOperation::Remove
        )
    }
}

impl Display for MongoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown operation name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownOperation(pub String);

impl FromStr for MongoOperation {
    type Err = UnknownOperation;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownOperation(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::MongoOperation;

    #[test]
    fn operations_parse_case_insensitively() {
        assert_eq!("count".parse::<MongoOperation>(), Ok(MongoOperation::Count));
        assert_eq!("FINDBYID".parse::<MongoOperation>(), Ok(MongoOperation::FindById));
        assert_eq!(
            "getDbStats".parse::<MongoOperation>().map(|op| op.to_string()),
            Ok("getDbStats".to_string())
        );
        assert!("aggregate".parse::<MongoOperation>().is_err());
    }

    #[test]
    fn only_db_stats_works_without_collection() {
        let without: Vec<_> = MongoOperation::ALL
            .into_iter()
            .filter(|operation| !operation.requires_collection())
            .collect();

        assert_eq!(without, vec![MongoOperation::GetDbStats]);
    }
}
