//! Conversions between domain structs and DynamoDB item maps, in one place so
//! repositories all speak the same dialect of `serde_dynamo`.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use service_core::ddb::get_item::GetItem;
use service_core::ddb::put_item::PutItem;
use service_core::ddb::query::Query;
use service_core::ddb::scan::Scan;
use service_core::ddb::update_item::UpdateItem;

/// The full set of datastore capabilities a repository may need, bundled so
/// repositories can be generic over the real adapter and over test fakes.
pub trait ThreadSafeDdbClient: PutItem + GetItem + Query + Scan + UpdateItem + Send + Sync {}
impl<T: PutItem + GetItem + Query + Scan + UpdateItem + Send + Sync> ThreadSafeDdbClient for T {}

pub(crate) fn to_hashmap<T: Serialize>(value: &T) -> Result<HashMap<String, AttributeValue>, serde_dynamo::Error> {
    serde_dynamo::aws_sdk_dynamodb_1::to_item(value)
}

pub(crate) fn from_hashmap<T: DeserializeOwned>(
    item: HashMap<String, AttributeValue>,
) -> Result<T, serde_dynamo::Error> {
    serde_dynamo::aws_sdk_dynamodb_1::from_item(item)
}
