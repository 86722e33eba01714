//! S-expression rendering of descriptors for test expectations.

use typeconv_types::TypeDescriptor;

/// `java.util.List<int>` → `(type java.util.List (type int))`.
pub fn format_descriptor(descriptor: &TypeDescriptor) -> String {
    let mut out = String::new();
    write_descriptor(&mut out, descriptor);
    out
}

fn write_descriptor(out: &mut String, descriptor: &TypeDescriptor) {
    out.push_str("(type ");
    out.push_str(&descriptor.raw_name);
    for argument in &descriptor.type_arguments {
        out.push(' ');
        write_descriptor(out, argument);
    }
    out.push(')');
}
