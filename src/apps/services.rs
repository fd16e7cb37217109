//! In-house services cloned from GitHub and built under `/opt/<name>`.

use crate::component::CatalogueApp;
use crate::target::TargetDescriptor;
use crate::template::{CustomAction, TemplateTable, UnitFile};

/// Root-owned service that restarts immediately and never hits the start
/// limit.
const fn opt_service(
    name: &'static str,
    description: &'static str,
    working_directory: &'static str,
    exec_start: &'static str,
) -> UnitFile {
    UnitFile::service(name, description, exec_start)
        .start_limit("0", None)
        .restart("always", Some("1"))
        .user("root")
        .working_directory(working_directory)
}

const ALERTHISTORY_UNIT: UnitFile = opt_service(
    "alerthistory",
    "Alerthistory Service",
    "/opt/alerthistory",
    "/opt/alerthistory/alerthistoryserver --port=8082 --db-path=/var/lib/alerthistory/alerthistory.db",
);

const ALERTBOARD_UNIT: UnitFile = opt_service(
    "alertboard",
    "Alertboard Service",
    "/opt/alertboard",
    "/opt/alertboard/alertboard",
);

const CERTMANAGER_UNIT: UnitFile = opt_service(
    "certmanager",
    "Certmanager Service",
    "/opt/certmanager",
    "/opt/certmanager/certmanager --port=8081",
);

const EDICHECK_UNIT: UnitFile = UnitFile::service(
    "edicheck",
    "EDICheck",
    "/opt/edicheck/edicheckd --config-file=/etc/edicheck/config.yaml \
     --etcd-endpoints \"http://10.15.91.217:2379,http://10.15.91.231:2379,http://10.15.91.215:2379\"",
)
.network_online()
.working_directory("/opt/edicheck");

const JOURNEXD_UNIT: UnitFile = opt_service(
    "journexd",
    "Journexd Service",
    "/opt/journexd",
    "/opt/journexd/journexd",
);

const MORPHOCM_UNIT: UnitFile = opt_service(
    "morphocm",
    "Morpho CM Change Management Service",
    "/opt/morphocm",
    "/opt/morphocm/morphocm --port=8089",
);

const GLEC_UNIT: UnitFile = UnitFile::service(
    "glec",
    "Go Leader Election Component Service",
    "/opt/glec/glec",
)
.start_limit("0", None)
.restart("always", Some("1"))
.user("root");

fn alerthistory_unit(_: &TargetDescriptor) -> String {
    ALERTHISTORY_UNIT.render()
}

fn alertboard_unit(_: &TargetDescriptor) -> String {
    ALERTBOARD_UNIT.render()
}

fn certmanager_unit(_: &TargetDescriptor) -> String {
    CERTMANAGER_UNIT.render()
}

fn edicheck_unit(_: &TargetDescriptor) -> String {
    EDICHECK_UNIT.render()
}

fn journexd_unit(_: &TargetDescriptor) -> String {
    JOURNEXD_UNIT.render()
}

fn morphocm_unit(_: &TargetDescriptor) -> String {
    MORPHOCM_UNIT.render()
}

fn glec_unit(_: &TargetDescriptor) -> String {
    GLEC_UNIT.render()
}

pub const ALERTHISTORY: CatalogueApp = CatalogueApp {
    name: "alerthistory",
    description: "Alert history recorder",
    install: &[
        "cd /opt && sudo git clone https://github.com/TRUECOMMERCEDK/alerthistory.git",
        "cd /opt/alerthistory && sudo make build",
        "mkdir -p /etc/alerthistory",
        "mkdir -p /var/lib/alerthistory",
        "chmod 700 /var/lib/alerthistory",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl enable --now alerthistory.service",
    ],
    update: &[
        "sudo systemctl stop alerthistory.service",
        "git -C /opt/alerthistory fetch origin main",
        "git -C /opt/alerthistory reset --hard origin/main",
        "cd /opt/alerthistory && sudo make build",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl restart alerthistory.service",
    ],
    secondary_on_install: false,
    templates: TemplateTable::new(&[(CustomAction::CreateUnitFile, alerthistory_unit)]),
};

pub const ALERTBOARD: CatalogueApp = CatalogueApp {
    name: "alertboard",
    description: "Alert dashboard",
    install: &[
        "sudo apt-get install build-essential -y",
        "sudo apt install golang-go -y",
        "cd /opt && sudo git clone https://github.com/TRUECOMMERCEDK/alertboard.git",
        "cd /opt/alertboard && sudo make build",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl enable --now alertboard.service",
    ],
    update: &[
        "sudo systemctl stop alertboard.service",
        "git -C /opt/alertboard fetch --all --tags",
        "git -C /opt/alertboard reset --hard origin/main",
        "cd /opt/alertboard && sudo make build",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl restart alertboard.service",
    ],
    secondary_on_install: false,
    templates: TemplateTable::new(&[(CustomAction::CreateUnitFile, alertboard_unit)]),
};

pub const CERTMANAGER: CatalogueApp = CatalogueApp {
    name: "certmanager",
    description: "Certificate inventory service",
    install: &[
        "sudo apt-get install build-essential -y",
        "sudo apt install golang-go -y",
        "cd /opt && sudo git clone https://github.com/TRUECOMMERCEDK/certmanager.git",
        "cd /opt/certmanager && sudo make build",
        "mkdir -p /etc/certmanager",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl enable --now certmanager.service",
    ],
    update: &[
        "sudo systemctl stop certmanager.service",
        "git -C /opt/certmanager fetch --all --tags",
        "git -C /opt/certmanager reset --hard origin/main",
        "cd /opt/certmanager && sudo make build",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl restart certmanager.service",
    ],
    secondary_on_install: false,
    templates: TemplateTable::new(&[(CustomAction::CreateUnitFile, certmanager_unit)]),
};

pub const EDICHECK: CatalogueApp = CatalogueApp {
    name: "edicheck",
    description: "EDI connectivity checker",
    install: &[
        "sudo apt-get install build-essential -y",
        "sudo apt install golang-go -y",
        "cd /opt && sudo git clone https://github.com/TRUECOMMERCEDK/edicheck.git",
        "cd /opt/edicheck && sudo make build",
        "mkdir -p /etc/edicheck",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl enable --now edicheck.service",
    ],
    update: &[
        "sudo systemctl stop edicheck.service",
        "git -C /opt/edicheck fetch --all --tags",
        "git -C /opt/edicheck reset --hard origin/main",
        "cd /opt/edicheck && sudo make build",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl restart edicheck.service",
    ],
    secondary_on_install: false,
    templates: TemplateTable::new(&[(CustomAction::CreateUnitFile, edicheck_unit)]),
};

pub const JOURNEXD: CatalogueApp = CatalogueApp {
    name: "journexd",
    description: "Journal export daemon",
    install: &[
        "sudo apt-get install build-essential -y",
        "sudo apt install golang-go -y",
        "cd /opt && sudo git clone https://github.com/TRUECOMMERCEDK/journexd.git",
        "cd /opt/journexd && sudo make build",
        "mkdir -p /etc/journexd",
        "mkdir -p /var/lib/journexd",
        "chmod 700 /var/lib/journexd",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl enable --now journexd.service",
    ],
    update: &[
        "sudo systemctl stop journexd.service",
        "git -C /opt/journexd fetch --all --tags",
        "git -C /opt/journexd reset --hard origin/main",
        "cd /opt/journexd && sudo make build",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl restart journexd.service",
    ],
    secondary_on_install: false,
    templates: TemplateTable::new(&[(CustomAction::CreateUnitFile, journexd_unit)]),
};

pub const MORPHOCM: CatalogueApp = CatalogueApp {
    name: "morphocm",
    description: "Morpho CM change management",
    install: &[
        "sudo apt-get install build-essential -y",
        "sudo apt install golang-go -y",
        "cd /opt && sudo git clone https://github.com/TRUECOMMERCEDK/morphocm.git",
        "cd /opt/morphocm && sudo make build",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl enable --now morphocm.service",
    ],
    update: &[
        "sudo systemctl stop morphocm.service",
        "git -C /opt/morphocm fetch --all --tags",
        "git -C /opt/morphocm reset --hard origin/main",
        "cd /opt/morphocm && sudo make build",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl restart morphocm.service",
    ],
    secondary_on_install: false,
    templates: TemplateTable::new(&[(CustomAction::CreateUnitFile, morphocm_unit)]),
};

pub const GLEC: CatalogueApp = CatalogueApp {
    name: "glec",
    description: "Go leader election component",
    install: &[
        "cd /opt && sudo git clone https://github.com/elsgaard/glec.git",
        "cd /opt/glec && sudo make build",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl enable --now glec.service",
    ],
    update: &[
        "git -C /opt/glec fetch origin main",
        "git -C /opt/glec reset --hard origin/main",
        "cd /opt/glec && make build",
    ],
    secondary_on_install: false,
    templates: TemplateTable::new(&[(CustomAction::CreateUnitFile, glec_unit)]),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::plan::Step;

    fn unit_of(app: &CatalogueApp) -> String {
        app.resolve(&Step::custom("CreateUnitFile"), &TargetDescriptor::new("h", "u", "p"))
    }

    #[test]
    fn test_opt_service_layout() {
        let cmd = unit_of(&MORPHOCM);
        assert!(cmd.starts_with("sudo bash -c 'cat > /etc/systemd/system/morphocm.service <<EOF\n"));
        assert!(cmd.contains("StartLimitIntervalSec=0\n"));
        assert!(cmd.contains("Restart=always\nRestartSec=1\nUser=root\n"));
        assert!(cmd.contains("WorkingDirectory=/opt/morphocm\nExecStart=/opt/morphocm/morphocm --port=8089\n"));
    }

    #[test]
    fn test_edicheck_keeps_quoted_endpoints() {
        let cmd = unit_of(&EDICHECK);
        assert!(cmd.contains("Wants=network-online.target\n"));
        assert!(cmd.contains("--etcd-endpoints \"http://10.15.91.217:2379,"));
        assert!(!cmd.contains("User="));
    }

    #[test]
    fn test_journexd_update_stays_in_its_own_tree() {
        let plan = JOURNEXD.update_plan();
        for step in plan.steps() {
            assert!(!step.label().contains("sftrip"), "stray path in {}", step);
        }
    }

    #[test]
    fn test_build_tooling_installs_non_interactively() {
        for app in [ALERTBOARD, CERTMANAGER, EDICHECK, JOURNEXD, MORPHOCM] {
            let plan = app.install_plan(&TargetDescriptor::new("h", "u", "p"));
            assert_eq!(plan.steps()[0], Step::literal("sudo apt-get install build-essential -y"));
        }
    }

    #[test]
    fn test_glec_unit_has_no_working_directory() {
        let cmd = unit_of(&GLEC);
        assert!(cmd.contains("ExecStart=/opt/glec/glec\n"));
        assert!(!cmd.contains("WorkingDirectory="));
    }
}
