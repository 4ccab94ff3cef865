pub mod garage_dto;
