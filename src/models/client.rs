// src/models/client.rs

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::serde_utils::double_option;

// Formato 00.000.000/0000-00
pub static CNPJ_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$").unwrap());

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Ativo,
    Inativo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClientCategory {
    Restaurante,
    Mercado,
    Hortifruti,
    LanchoneteCafeteria,
    Bar,
    PadariaConfeitaria,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "responsible_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResponsibleType {
    ResponsavelEstabelecimento,
    ResponsavelTecnico,
}

// --- ENTIDADES ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Client {
    pub id: i32,
    pub status: ClientStatus,
    #[schema(example = "Padaria Pão Quente")]
    pub nome_fantasia: String,
    pub categoria: ClientCategory,
    pub razao_social: String,
    #[schema(example = "12.345.678/0001-99")]
    pub cnpj: String,

    pub inscricao_estadual: Option<String>,
    pub inscricao_municipal: Option<String>,
    pub email: Option<String>,
    pub site_instagram: Option<String>,
    pub telefone_contato_1: Option<String>,
    pub telefone_contato_2: Option<String>,
    pub endereco: Option<String>,
    pub numero: Option<String>,
    pub bairro: Option<String>,
    pub complemento: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub logo_url: Option<String>,

    pub criado_em: DateTime<Utc>,
    pub atualizado_em: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClientResponsible {
    pub id: i32,
    pub cliente_id: i32,
    pub tipo: ResponsibleType,
    pub nome_completo: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cpf: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClientCollaborators {
    pub id: i32,
    pub cliente_id: i32,
    pub numero_total_colaboradores: Option<i32>,
    pub numero_manipuladores_alimentos: Option<i32>,
}

// --- RESPOSTAS ---

// Cliente completo, com responsáveis e colaboradores
#[derive(Debug, Serialize, ToSchema)]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub responsaveis: Vec<ClientResponsible>,
    pub colaboradores_info: Option<ClientCollaborators>,
}

// Linha da listagem de clientes
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ClientSummary {
    pub id: i32,
    pub status: ClientStatus,
    pub nome_fantasia: String,
    pub categoria: ClientCategory,
    pub cnpj: String,
    pub logo_url: Option<String>,
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResponsiblePayload {
    pub tipo: ResponsibleType,
    pub nome_completo: Option<String>,
    #[validate(email(message = "O e-mail do responsável é inválido."))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cpf: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CollaboratorsPayload {
    #[validate(range(min = 0, message = "O número de colaboradores não pode ser negativo."))]
    pub numero_total_colaboradores: Option<i32>,
    #[validate(range(min = 0, message = "O número de manipuladores não pode ser negativo."))]
    pub numero_manipuladores_alimentos: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClientPayload {
    pub status: ClientStatus,
    #[validate(length(min = 1, max = 255, message = "O nome fantasia é obrigatório."))]
    pub nome_fantasia: String,
    pub categoria: ClientCategory,
    #[validate(length(min = 1, max = 255, message = "A razão social é obrigatória."))]
    pub razao_social: String,
    #[validate(regex(path = *CNPJ_REGEX, message = "CNPJ deve estar no formato 00.000.000/0000-00."))]
    #[schema(example = "12.345.678/0001-99")]
    pub cnpj: String,

    pub inscricao_estadual: Option<String>,
    pub inscricao_municipal: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub site_instagram: Option<String>,
    pub telefone_contato_1: Option<String>,
    pub telefone_contato_2: Option<String>,
    pub endereco: Option<String>,
    pub numero: Option<String>,
    pub bairro: Option<String>,
    pub complemento: Option<String>,
    pub cidade: Option<String>,
    #[validate(length(max = 2, message = "Use a sigla do estado (2 letras)."))]
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub logo_url: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub responsaveis: Vec<ResponsiblePayload>,
    #[validate(nested)]
    pub colaboradores_info: Option<CollaboratorsPayload>,
}

// Todos os campos opcionais: só o que vier é alterado.
// Nos campos anuláveis, `null` explícito limpa o valor.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClientPayload {
    pub status: Option<ClientStatus>,
    #[validate(length(min = 1, max = 255, message = "O nome fantasia não pode ser vazio."))]
    pub nome_fantasia: Option<String>,
    pub categoria: Option<ClientCategory>,
    #[validate(length(min = 1, max = 255, message = "A razão social não pode ser vazia."))]
    pub razao_social: Option<String>,
    #[validate(regex(path = *CNPJ_REGEX, message = "CNPJ deve estar no formato 00.000.000/0000-00."))]
    pub cnpj: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub inscricao_estadual: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub inscricao_municipal: Option<Option<String>>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub site_instagram: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub telefone_contato_1: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub telefone_contato_2: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub endereco: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub numero: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub bairro: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub complemento: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub cidade: Option<Option<String>>,
    #[validate(length(max = 2, message = "Use a sigla do estado (2 letras)."))]
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub estado: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub cep: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub logo_url: Option<Option<String>>,

    // Se presente, substitui TODOS os responsáveis
    #[validate(nested)]
    pub responsaveis: Option<Vec<ResponsiblePayload>>,
    #[validate(nested)]
    pub colaboradores_info: Option<CollaboratorsPayload>,
}

#[derive(Debug, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListClientsQuery {
    #[serde(default)]
    #[validate(range(min = 0, message = "skip não pode ser negativo."))]
    pub skip: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit deve estar entre 1 e 100."))]
    pub limit: i64,
    /// Busca por nome fantasia ou CNPJ
    pub search: Option<String>,
}

pub fn default_limit() -> i64 {
    100
}

impl Client {
    /// Aplica os campos escalares presentes no payload.
    /// Responsáveis e colaboradores são tratados pelo serviço.
    pub fn apply_update(&mut self, payload: &UpdateClientPayload) {
        if let Some(status) = payload.status {
            self.status = status;
        }
        if let Some(nome_fantasia) = &payload.nome_fantasia {
            self.nome_fantasia = nome_fantasia.clone();
        }
        if let Some(categoria) = payload.categoria {
            self.categoria = categoria;
        }
        if let Some(razao_social) = &payload.razao_social {
            self.razao_social = razao_social.clone();
        }
        if let Some(cnpj) = &payload.cnpj {
            self.cnpj = cnpj.clone();
        }

        let optionals = [
            (&mut self.inscricao_estadual, &payload.inscricao_estadual),
            (&mut self.inscricao_municipal, &payload.inscricao_municipal),
            (&mut self.email, &payload.email),
            (&mut self.site_instagram, &payload.site_instagram),
            (&mut self.telefone_contato_1, &payload.telefone_contato_1),
            (&mut self.telefone_contato_2, &payload.telefone_contato_2),
            (&mut self.endereco, &payload.endereco),
            (&mut self.numero, &payload.numero),
            (&mut self.bairro, &payload.bairro),
            (&mut self.complemento, &payload.complemento),
            (&mut self.cidade, &payload.cidade),
            (&mut self.estado, &payload.estado),
            (&mut self.cep, &payload.cep),
            (&mut self.logo_url, &payload.logo_url),
        ];
        for (field, value) in optionals {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_client() -> Client {
        Client {
            id: 7,
            status: ClientStatus::Ativo,
            nome_fantasia: "Padaria Pão Quente".into(),
            categoria: ClientCategory::PadariaConfeitaria,
            razao_social: "Pão Quente LTDA".into(),
            cnpj: "12.345.678/0001-99".into(),
            inscricao_estadual: None,
            inscricao_municipal: None,
            email: Some("contato@paoquente.com".into()),
            site_instagram: None,
            telefone_contato_1: None,
            telefone_contato_2: None,
            endereco: None,
            numero: None,
            bairro: None,
            complemento: None,
            cidade: Some("Campinas".into()),
            estado: Some("SP".into()),
            cep: None,
            logo_url: None,
            criado_em: Utc::now(),
            atualizado_em: None,
        }
    }

    #[test]
    fn cnpj_pattern_accepts_only_formatted_numbers() {
        assert!(CNPJ_REGEX.is_match("12.345.678/0001-99"));
        assert!(!CNPJ_REGEX.is_match("12345678000199"));
        assert!(!CNPJ_REGEX.is_match("12.345.678/0001-9"));
    }

    #[test]
    fn create_payload_validates_cnpj_and_nested_collaborators() {
        let payload: CreateClientPayload = serde_json::from_value(serde_json::json!({
            "status": "ativo",
            "nome_fantasia": "Bar do Zé",
            "categoria": "bar",
            "razao_social": "Zé Bebidas ME",
            "cnpj": "123",
            "colaboradores_info": { "numero_total_colaboradores": -1 }
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.errors();
        assert!(fields.contains_key("cnpj"));
        assert!(fields.contains_key("colaboradores_info"));
        assert!(payload.responsaveis.is_empty());
    }

    #[test]
    fn partial_update_keeps_absent_fields() {
        let mut client = sample_client();
        let payload = UpdateClientPayload {
            nome_fantasia: Some("Padaria Nova".into()),
            estado: Some(Some("RJ".into())),
            ..Default::default()
        };

        client.apply_update(&payload);

        assert_eq!(client.nome_fantasia, "Padaria Nova");
        assert_eq!(client.estado.as_deref(), Some("RJ"));
        assert_eq!(client.cidade.as_deref(), Some("Campinas"));
        assert_eq!(client.email.as_deref(), Some("contato@paoquente.com"));
        assert_eq!(client.cnpj, "12.345.678/0001-99");
    }

    #[test]
    fn explicit_null_clears_optional_field() {
        let mut client = sample_client();
        let payload: UpdateClientPayload =
            serde_json::from_str(r#"{"email": null, "cep": "13010-000"}"#).unwrap();
        assert!(payload.validate().is_ok());

        client.apply_update(&payload);

        assert!(client.email.is_none());
        assert_eq!(client.cep.as_deref(), Some("13010-000"));
        // Campos ausentes continuam como estavam
        assert_eq!(client.cidade.as_deref(), Some("Campinas"));
        assert_eq!(client.estado.as_deref(), Some("SP"));
    }

    #[test]
    fn update_still_validates_present_values() {
        let payload: UpdateClientPayload =
            serde_json::from_str(r#"{"email": "nao-e-email", "estado": "SPX"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("estado"));
    }

    #[test]
    fn category_uses_snake_case_on_the_wire() {
        let value = serde_json::to_value(ClientCategory::LanchoneteCafeteria).unwrap();
        assert_eq!(value, "lanchonete_cafeteria");
    }
}
