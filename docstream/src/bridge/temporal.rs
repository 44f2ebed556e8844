// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Date-times travel through Avro as a record with a single string field called `$date`.

use crate::{
    AvroResult,
    error::Details,
    schema::{RecordSchema, Schema},
    types::Value,
    validator::DATE_WRAPPER_FIELD,
};
use chrono::{DateTime, Datelike, Utc};

/// Number of 100ns ticks in a second, the resolution of the rendered fraction.
const TICKS_PER_SECOND: u32 = 10_000_000;

/// Whether `record` is the date-time wrapper: exactly one field, `$date`, of type `string`.
pub fn is_date_wrapper(record: &RecordSchema) -> bool {
    matches!(
        record.fields.as_slice(),
        [field] if field.name == DATE_WRAPPER_FIELD && field.schema == Schema::String
    )
}

/// Renders `date_time` as `YYYY-MM-DDTHH:MM:SS.fffffffZ`, seven fractional digits in UTC.
///
/// Only years 0000 to 9999 fit the four digit year, anything else is a
/// [`Details::DateTimeOutOfRange`] conversion error.
pub fn render_date_time(date_time: &DateTime<Utc>) -> AvroResult<String> {
    if !(0..=9999).contains(&date_time.year()) {
        return Err(Details::DateTimeOutOfRange(date_time.to_string()).into());
    }
    // leap seconds report more than a second of nanos
    let ticks = (date_time.timestamp_subsec_nanos() / 100).min(TICKS_PER_SECOND - 1);
    Ok(format!("{}.{ticks:07}Z", date_time.format("%Y-%m-%dT%H:%M:%S")))
}

pub(crate) fn wrap_date_time(date_time: &DateTime<Utc>) -> AvroResult<Value> {
    Ok(Value::Record(vec![(
        DATE_WRAPPER_FIELD.to_string(),
        Value::String(render_date_time(date_time)?),
    )]))
}
