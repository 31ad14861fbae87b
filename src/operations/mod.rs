//! Abstract operations shared by the object model, built-ins and the AST driver

pub mod comparison;
pub mod conversion;
pub mod descriptor;
pub mod iterator;
pub mod number;
pub mod object;

pub use comparison::{
    RelationalOp, instance_of, is_less_than, is_loosely_equal, is_strictly_equal,
    ordinary_has_instance, relational_compare, same_value, same_value_zero,
};
pub use conversion::{
    PreferredType, canonical_numeric_index_string, f64_to_int32, f64_to_uint32,
    integer_or_infinity, ordinary_to_primitive, require_object_coercible, to_int32,
    to_integer_or_infinity, to_length, to_number, to_object, to_primitive, to_property_key,
    to_string, to_uint32,
};
pub use descriptor::{from_property_descriptor, to_property_descriptor};
pub use iterator::{
    IteratorRecord, create_iter_result_object, get_iterator, get_iterator_from_method,
    iterable_to_list, iterator_close, iterator_complete, iterator_next, iterator_step,
    iterator_step_value, iterator_value,
};
pub use number::{
    number_to_string, number_to_string_radix, parse_float, parse_int, string_to_number,
};
pub use object::{
    EnumerableKind, IntegrityLevel, ListElementTypes, copy_data_properties, create_array_from_list,
    create_data_property, create_data_property_or_throw, create_list_from_array_like,
    define_property_or_throw, delete_property_or_throw, enumerable_own_properties, get, get_method,
    get_v, has_own_property, has_property, index_key, invoke, is_array, join_values,
    length_of_array_like, set, set_integrity_level, species_constructor, test_integrity_level,
};
