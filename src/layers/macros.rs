//! Macros to reduce boilerplate in overlay implementations

/// Implements the property accessors of [`Overlay`](crate::traits::Overlay)
/// by delegating to a `LayerProperties` field.
///
/// This generates implementations for:
/// - id(), name(), layer_type()
/// - z_index(), set_z_index()
/// - is_visible(), set_visible()
///
/// Usage:
/// ```ignore
/// impl Overlay for MyOverlay {
///     impl_layer_trait!(MyOverlay, properties);
///     fn options(&self) -> serde_json::Value { serde_json::json!({}) }
/// }
/// ```
#[macro_export]
macro_rules! impl_layer_trait {
    ($layer_type:ty, $properties_field:ident) => {
        fn id(&self) -> &str {
            &self.$properties_field.id
        }

        fn name(&self) -> &str {
            &self.$properties_field.name
        }

        fn layer_type(&self) -> $crate::layers::base::LayerType {
            self.$properties_field.layer_type
        }

        fn z_index(&self) -> i32 {
            self.$properties_field.z_index
        }

        fn set_z_index(&mut self, z_index: i32) {
            self.$properties_field.z_index = z_index;
        }

        fn is_visible(&self) -> bool {
            self.$properties_field.visible
        }

        fn set_visible(&mut self, visible: bool) {
            self.$properties_field.visible = visible;
        }
    };
}
