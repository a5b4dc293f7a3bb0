use async_trait::async_trait;

use crate::service::{sorted_fields, Application, Form, Service, ServiceListing, ServiceWithForm};

use super::Result;

/// Repository for services and their forms.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Writes a service and its form atomically. Either both items exist
    /// afterwards or neither does.
    async fn create_service_with_form(&self, service: &Service, form: &Form) -> Result<()>;

    /// Gets a service by its ID.
    async fn get_service(&self, service_id: &str) -> Result<Option<Service>>;

    /// Gets the form attached to a service.
    async fn get_form_for_service(&self, service_id: &str) -> Result<Option<Form>>;

    /// Lists a company's services, projected to their summary attributes.
    async fn list_services_by_company(&self, company_id: &str) -> Result<ServiceListing>;

    /// Gets a service together with its form fields sorted by `field_number`.
    ///
    /// Returns `None` when the service does not exist or belongs to another
    /// company, without looking up the form. A service with no form yields an
    /// empty field list.
    async fn get_service_with_form(
        &self,
        company_id: &str,
        service_id: &str,
    ) -> Result<Option<ServiceWithForm>> {
        let service = match self.get_service(service_id).await? {
            Some(service) if service.company_id == company_id => service,
            _ => return Ok(None),
        };

        let form = self.get_form_for_service(service_id).await?;
        let (form_id, fields) = match form {
            Some(form) => (Some(form.id), sorted_fields(&form.fields)),
            None => (None, Vec::new()),
        };

        Ok(Some(ServiceWithForm {
            service,
            form_id,
            fields,
        }))
    }
}

/// Repository for submitted applications.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Writes a new application. The referenced service and form are not checked.
    async fn create_application(&self, application: &Application) -> Result<()>;

    /// Lists the applications submitted by a user.
    async fn list_applications_by_user(&self, user_id: &str) -> Result<Vec<Application>>;

    /// Lists the applications received by a company.
    async fn list_applications_by_company(&self, company_id: &str) -> Result<Vec<Application>>;

    /// Lists the applications submitted to a service.
    async fn list_applications_by_service(&self, service_id: &str) -> Result<Vec<Application>>;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use super::*;
    use crate::service::{FieldCategory, FieldDataType, FieldType, FormField};

    /// Serves one fixed service and form, counting form lookups.
    struct FixedRepository {
        service: Option<Service>,
        form: Option<Form>,
        form_lookups: AtomicUsize,
    }

    impl FixedRepository {
        fn new(service: Option<Service>, form: Option<Form>) -> Self {
            Self {
                service,
                form,
                form_lookups: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ServiceRepository for FixedRepository {
        async fn create_service_with_form(&self, _service: &Service, _form: &Form) -> Result<()> {
            Ok(())
        }

        async fn get_service(&self, service_id: &str) -> Result<Option<Service>> {
            Ok(self.service.clone().filter(|s| s.id == service_id))
        }

        async fn get_form_for_service(&self, _service_id: &str) -> Result<Option<Form>> {
            self.form_lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.form.clone())
        }

        async fn list_services_by_company(&self, _company_id: &str) -> Result<ServiceListing> {
            Ok(ServiceListing::default())
        }
    }

    fn field(id: &str, field_number: i64) -> FormField {
        FormField {
            field_id: id.to_string(),
            field_title: id.to_string(),
            field_description: String::new(),
            field_category: FieldCategory::Text,
            field_type: FieldType::Short,
            field_data_type: FieldDataType::Text,
            field_required: false,
            field_number,
        }
    }

    fn service() -> Service {
        Service::new("SVC1", "7", "Pilates", "Group classes", Utc::now())
    }

    #[tokio::test]
    async fn test_missing_service_skips_form_lookup() {
        let repo = FixedRepository::new(None, None);

        let result = repo.get_service_with_form("7", "SVC1").await.unwrap();

        assert!(result.is_none());
        assert_eq!(repo.form_lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_service_of_other_company_is_hidden() {
        let repo = FixedRepository::new(Some(service()), None);

        let result = repo.get_service_with_form("8", "SVC1").await.unwrap();

        assert!(result.is_none());
        assert_eq!(repo.form_lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_service_without_form_has_empty_fields() {
        let repo = FixedRepository::new(Some(service()), None);

        let result = repo.get_service_with_form("7", "SVC1").await.unwrap().unwrap();

        assert_eq!(result.service.name, "Pilates");
        assert!(result.form_id.is_none());
        assert!(result.fields.is_empty());
    }

    #[tokio::test]
    async fn test_fields_come_back_sorted() {
        let form = Form::new("FRM1", "SVC1", vec![field("b", 2), field("a", 1)], Utc::now());
        let repo = FixedRepository::new(Some(service()), Some(form));

        let result = repo.get_service_with_form("7", "SVC1").await.unwrap().unwrap();

        assert_eq!(result.form_id.as_deref(), Some("FRM1"));
        let numbers: Vec<i64> = result.fields.iter().map(|f| f.field_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(repo.form_lookups.load(Ordering::SeqCst), 1);
    }
}
