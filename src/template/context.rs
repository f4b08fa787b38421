// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fmt;

use crate::farm;

/// A node reached while walking a placeholder path.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    /// The field exists on the record shape but carries no value.
    Absent,
    Text(&'a str),
    Record(&'a dyn Record),
}

impl<'a> Value<'a> {
    fn text(value: &'a Option<String>) -> Self {
        match value {
            Some(v) => Value::Text(v),
            None => Value::Absent,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Record(r) => f.write_str(r.shape()),
        }
    }
}

/// A record shape with a closed set of named fields.
///
/// `field` matches names case-insensitively and returns `None` only when the
/// name is not one of the shape's fields.
pub trait Record {
    fn shape(&self) -> &'static str;

    fn field(&self, name: &str) -> Option<Value<'_>>;
}

/// The properties of a device-farm job visible to templates under `job`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobContext {
    pub arn: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub result: Option<String>,
    pub device: Option<DeviceContext>,
}

/// The `job.device` record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceContext {
    pub arn: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub form_factor: Option<String>,
    pub name: Option<String>,
    pub os: Option<String>,
    pub platform: Option<String>,
}

impl Record for JobContext {
    fn shape(&self) -> &'static str {
        "job"
    }

    fn field(&self, name: &str) -> Option<Value<'_>> {
        let value = match name.to_ascii_lowercase().as_str() {
            "arn" => Value::text(&self.arn),
            "name" => Value::text(&self.name),
            "status" => Value::text(&self.status),
            "result" => Value::text(&self.result),
            "device" => match &self.device {
                Some(device) => Value::Record(device),
                None => Value::Absent,
            },
            _ => return None,
        };
        Some(value)
    }
}

impl Record for DeviceContext {
    fn shape(&self) -> &'static str {
        "device"
    }

    fn field(&self, name: &str) -> Option<Value<'_>> {
        let value = match name.to_ascii_lowercase().as_str() {
            "arn" => Value::text(&self.arn),
            "manufacturer" => Value::text(&self.manufacturer),
            "model" => Value::text(&self.model),
            "formfactor" => Value::text(&self.form_factor),
            "name" => Value::text(&self.name),
            "os" => Value::text(&self.os),
            "platform" => Value::text(&self.platform),
            _ => return None,
        };
        Some(value)
    }
}

impl From<&farm::Job> for JobContext {
    fn from(job: &farm::Job) -> Self {
        JobContext {
            arn: Some(job.arn.clone()),
            name: job.name.clone(),
            status: job.status.as_ref().map(ToString::to_string),
            result: job.result.as_ref().map(ToString::to_string),
            device: job.device.as_ref().map(DeviceContext::from),
        }
    }
}

impl From<&farm::Device> for DeviceContext {
    fn from(device: &farm::Device) -> Self {
        DeviceContext {
            arn: device.arn.clone(),
            manufacturer: device.manufacturer.clone(),
            model: device.model.clone(),
            form_factor: device.form_factor.clone(),
            name: device.name.clone(),
            os: device.os.clone(),
            platform: device.platform.clone(),
        }
    }
}
