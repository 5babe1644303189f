/// Generate a frozen `#[pyclass]` struct holding one numpy array per column
/// of a core `*Series` struct.
///
/// Also generates a `from_series()` constructor that moves every listed
/// column into a numpy array, and a `to_dict()` method.
macro_rules! define_series_result {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident from $core_type:ty {
            $($field:ident: $ty:ty),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[pyo3::pyclass(frozen)]
        $vis struct $name {
            $(
                #[pyo3(get)]
                pub $field: Py<numpy::PyArray1<$ty>>,
            )+
        }

        impl $name {
            pub fn from_series(py: pyo3::Python<'_>, series: &$core_type) -> Self {
                Self {
                    $(
                        $field: numpy::PyArray1::from_slice(py, &series.$field).unbind(),
                    )+
                }
            }

            pub fn column_dict<'py>(
                &self,
                py: pyo3::Python<'py>,
            ) -> pyo3::PyResult<pyo3::Bound<'py, pyo3::types::PyDict>> {
                let dict = pyo3::types::PyDict::new(py);
                $(
                    dict.set_item(stringify!($field), self.$field.bind(py))?;
                )+
                Ok(dict)
            }
        }
    };
}

/// Collect selected fields of a slice of records into a `PyDict` of numpy
/// arrays.
macro_rules! records_to_dict {
    ($py:expr, $records:expr, $($field:ident: $ty:ty),+ $(,)?) => {{
        let dict = pyo3::types::PyDict::new($py);
        $(
            let column: Vec<$ty> = $records.iter().map(|r| r.$field).collect();
            dict.set_item(stringify!($field), numpy::PyArray1::from_vec($py, column))?;
        )+
        dict
    }};
}
