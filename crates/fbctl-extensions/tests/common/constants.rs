//! Test constants for fbctl-extensions tests

#![allow(dead_code)]

pub const PROJECT_ID: &str = "demo-ext";
pub const PUBLISHER_ID: &str = "acme";
pub const EXTENSION_ID: &str = "resize-images";
pub const TEST_TOKEN: &str = "test-access-token";

/// A complete `extension.yaml` with one Storage-triggered function
pub const EXTENSION_YAML: &str = r#"
name: resize-images
version: 0.1.0
specVersion: v1beta
displayName: Resize Images
description: Resizes images uploaded to Cloud Storage.
license: Apache-2.0
sourceUrl: https://github.com/acme/resize-images
roles:
  - role: storage.admin
    reason: Allows the extension to store resized images.
resources:
  - name: generateResizedImage
    type: firebaseextensions.v1beta.function
    properties:
      location: ${LOCATION}
      runtime: nodejs18
      eventTrigger:
        eventType: google.storage.object.finalize
        resource: projects/_/buckets/${param:IMG_BUCKET}
params:
  - param: LOCATION
    label: Cloud Functions location
    type: select
    options:
      - value: us-central1
      - value: europe-west1
    default: us-central1
    required: true
  - param: IMG_BUCKET
    label: Cloud Storage bucket for images
    default: ${STORAGE_BUCKET}
    required: true
  - param: IMG_SIZES
    label: Sizes of resized images
    validationRegex: ^\d+x\d+(,\d+x\d+)*$
    default: 200x200
"#;
