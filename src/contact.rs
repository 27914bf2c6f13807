//! Address book entries

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::RecordId;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    id: RecordId,
    #[serde(deserialize_with = "crate::record::lenient")]
    name: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    phone: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    email: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    address: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    category: String,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl_record!(Contact, "contacts");

impl Contact {
    pub fn new(name: String, phone: String, email: String, address: String, category: String) -> Self {
        Self {
            name,
            phone,
            email,
            address,
            category,
            ..Self::default()
        }
    }

    pub fn id(&self) -> &RecordId   { &self.id       }
    pub fn name(&self) -> &str      { &self.name     }
    pub fn phone(&self) -> &str     { &self.phone    }
    pub fn email(&self) -> &str     { &self.email    }
    pub fn address(&self) -> &str   { &self.address  }
    pub fn category(&self) -> &str  { &self.category }

    pub fn set_name(&mut self, new_name: String)       { self.name = new_name; }
    pub fn set_phone(&mut self, new_phone: String)     { self.phone = new_phone; }
    pub fn set_email(&mut self, new_email: String)     { self.email = new_email; }
    pub fn set_address(&mut self, new_address: String) { self.address = new_address; }
}
