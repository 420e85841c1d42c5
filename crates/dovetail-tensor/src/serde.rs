use crate::{
    allocator::TensorAllocator, storage::TensorStorage, tensor::get_strides_from_shape, Tensor,
};

use serde::ser::SerializeStruct;
use serde::Deserialize;

impl<T, const N: usize, A> serde::Serialize for Tensor<T, N, A>
where
    T: serde::Serialize,
    A: TensorAllocator,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Tensor", 3)?;
        state.serialize_field("data", self.as_slice())?;
        state.serialize_field("shape", &self.shape.to_vec())?;
        state.serialize_field("strides", &self.strides.to_vec())?;
        state.end()
    }
}

impl<'de, T, const N: usize, A> serde::Deserialize<'de> for Tensor<T, N, A>
where
    T: serde::Deserialize<'de>,
    A: TensorAllocator + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct TensorData<T> {
            data: Vec<T>,
            shape: Vec<usize>,
            strides: Vec<usize>,
        }

        let TensorData {
            data,
            shape,
            strides,
        } = TensorData::deserialize(deserializer)?;

        let shape: [usize; N] = shape
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid shape"))?;

        let strides: [usize; N] = strides
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid strides"))?;

        if strides != get_strides_from_shape(shape) {
            return Err(serde::de::Error::custom("Non row-major strides"));
        }

        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(serde::de::Error::custom(format!(
                "Shape {shape:?} expects {numel} elements, got {}",
                data.len()
            )));
        }

        let storage = TensorStorage::from_vec(data, A::default()).map_err(serde::de::Error::custom)?;

        Ok(Tensor {
            storage,
            shape,
            strides,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{CpuAllocator, Tensor};

    #[test]
    fn test_serde() -> Result<(), Box<dyn std::error::Error>> {
        let tensor = Tensor::<u8, 2>::from_shape_vec([2, 3], vec![1, 2, 3, 4, 5, 6], CpuAllocator)?;
        let serialized = serde_json::to_string(&tensor)?;
        let deserialized: Tensor<u8, 2> = serde_json::from_str(&serialized)?;
        assert_eq!(tensor.as_slice(), deserialized.as_slice());
        assert_eq!(deserialized.shape, [2, 3]);
        Ok(())
    }

    #[test]
    fn test_serde_rejects_wrong_numel() {
        let json = r#"{"data":[1,2,3],"shape":[2,2],"strides":[2,1]}"#;
        let res: Result<Tensor<u8, 2>, _> = serde_json::from_str(json);
        assert!(res.is_err());
    }
}
